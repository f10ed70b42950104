//! Bitboard-based core for a UCI-speaking chess engine: geometry,
//! magic attack tables, Zobrist/PolyGlot keying, position state,
//! move generation, make/unmake, repetition detection, static
//! exchange evaluation, a king-and-pawn-vs-king bitbase, and a
//! lock-free transposition table.
//!
//! Search, evaluation, and the UCI protocol loop sit above this crate
//! and are out of scope here.

pub mod bitboard;
pub mod error;
pub mod kpk;
pub mod magic;
pub mod polyglot;
pub mod position;
pub mod tt;
pub mod types;
pub mod uci_move;
pub mod zobrist;

pub use position::Position;
pub use types::{Color, Move, MoveKind, Piece, PieceType, Square};
