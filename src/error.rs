//! Error types for the chess core.
//!
//! Parse-time failures are surfaced to the caller as ordinary
//! `Result`s; precondition violations inside the hot path are
//! programmer errors (`LogicError`) and only checked in debug builds.

use std::fmt;

/// A FEN / X-FEN string that does not describe a legal position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// FEN has fewer than the four mandatory fields.
    TooFewParts { found: usize },
    /// Board field did not describe exactly 8 ranks.
    WrongRankCount { found: usize },
    /// A rank described more or fewer than 8 files.
    WrongFileCount { rank: usize, found: usize },
    /// Unrecognized piece letter in the board field.
    InvalidPiece { ch: char },
    /// Side-to-move field was not `w` or `b`.
    InvalidSideToMove { found: String },
    /// Castling field contained an unrecognized letter.
    InvalidCastling { ch: char },
    /// Castling rights named a rook that isn't on the board.
    CastlingRookMissing { ch: char },
    /// En passant field was not `-` or a valid square.
    InvalidEnPassant { found: String },
    /// Halfmove clock / fullmove number field was not a valid integer.
    InvalidCounter { found: String },
    /// Neither, or only one, king is present.
    WrongKingCount { color_with_wrong_count: &'static str, found: usize },
    /// The side not to move is in check (illegal position).
    OpponentInCheck,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewParts { found } => {
                write!(f, "FEN must have at least 4 space-separated parts, found {found}")
            }
            Self::WrongRankCount { found } => {
                write!(f, "FEN board field must describe 8 ranks, found {found}")
            }
            Self::WrongFileCount { rank, found } => {
                write!(f, "rank {rank} describes {found} files, expected 8")
            }
            Self::InvalidPiece { ch } => write!(f, "invalid piece character '{ch}' in FEN"),
            Self::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            Self::InvalidCastling { ch } => write!(f, "invalid castling character '{ch}'"),
            Self::CastlingRookMissing { ch } => {
                write!(f, "castling right '{ch}' names a rook that is not on the board")
            }
            Self::InvalidEnPassant { found } => write!(f, "invalid en passant square '{found}'"),
            Self::InvalidCounter { found } => write!(f, "invalid integer field '{found}'"),
            Self::WrongKingCount { color_with_wrong_count, found } => {
                write!(f, "{color_with_wrong_count} has {found} kings, expected exactly 1")
            }
            Self::OpponentInCheck => {
                write!(f, "side not to move is in check, position is illegal")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Transposition table / startup configuration rejected by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Requested table size (in megabytes) is outside the supported range.
    TtSizeOutOfRange { requested_mb: usize, min_mb: usize, max_mb: usize },
    /// Magic number search exhausted its bounded budget for a square.
    MagicSearchExhausted { square: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TtSizeOutOfRange { requested_mb, min_mb, max_mb } => write!(
                f,
                "transposition table size {requested_mb}MB out of range [{min_mb}, {max_mb}]"
            ),
            Self::MagicSearchExhausted { square } => {
                write!(f, "no magic number found for square {square} within search budget")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A precondition violation: caller misused the API. These indicate a
/// bug in the caller (search driver), not a data error, and only
/// `panic!` in debug builds; release builds leave the behavior
/// unspecified rather than pay for the check on every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicError {
    /// `undo_move`/`undo_null_move` called with an empty state stack.
    EmptyStateStack,
    /// `do_null_move` called while the side to move is in check.
    NullMoveInCheck,
    /// A move handed to `legal`/`do_move` did not decode to a square pair
    /// inside `0..64`, or reused the reserved NONE/NULL encodings.
    MalformedMove,
}

impl fmt::Display for LogicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStateStack => write!(f, "state stack is empty"),
            Self::NullMoveInCheck => write!(f, "cannot make a null move while in check"),
            Self::MalformedMove => write!(f, "move does not decode to a valid encoding"),
        }
    }
}

impl std::error::Error for LogicError {}

/// Panics with a [`LogicError`] in debug builds; a no-op in release
/// builds, matching spec.md §7's "programmer errors... may abort in
/// debug builds" propagation policy.
macro_rules! debug_assert_logic {
    ($cond:expr, $err:expr) => {
        debug_assert!($cond, "{}", $err);
    };
}

pub(crate) use debug_assert_logic;
