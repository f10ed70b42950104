//! Per-ply irreversible state, pushed and popped by `make_unmake`.
//!
//! Modeled as a plain struct in a caller-owned `Vec<State>` rather
//! than the linked `StateInfo` list the design this crate's make/
//! unmake contract is grounded on uses: `Position` indexes into its
//! own history stack instead of chasing a previous-state pointer.

use crate::types::{CastlingRights, Piece, Square, NO_PIECE, SQUARE_NONE};

/// Once `rule50` reaches this many plies, `has_rule50_high` latches on
/// and stays on for the rest of the game, even if `rule50` later drops
/// back below it (e.g. after a capture). Matches the fifty-move draw
/// threshold ([`crate::position::Position::is_fifty_move_draw`]), so
/// the evaluator's dampening and the actual draw rule agree on what
/// "deep into the fifty-move count" means.
pub const RULE50_HIGH_THRESHOLD: u16 = 100;

#[derive(Clone, Debug)]
pub struct State {
    pub key: u64,
    pub pawn_key: u64,
    /// `non_pawn_key[color][bucket]`, `bucket` from
    /// [`crate::zobrist::non_pawn_bucket`] (0 = minor, 1 = major).
    pub non_pawn_key: [[u64; 2]; 2],
    pub castling_rights: CastlingRights,
    pub en_passant: Square,
    pub rule50: u16,
    pub null_ply: u16,
    /// Sticky: once `rule50` has reached [`RULE50_HIGH_THRESHOLD`],
    /// stays `true` for the rest of the line even if `rule50` resets.
    pub has_rule50_high: bool,
    pub captured: Piece,
    pub checkers_bb: u64,
    /// `blockers_bb[c]`: pieces (either color) sitting between a
    /// slider and color `c`'s king.
    pub blockers_bb: [u64; 2],
    /// `pinners_bb[c]`: color `c`'s sliders that are pinning an
    /// opposing piece to that opponent's king.
    pub pinners_bb: [u64; 2],
    /// `check_squares[pt.index()]`: squares from which a piece of
    /// type `pt`, belonging to the side *not* to move, would check
    /// the side-to-move's king.
    pub check_squares: [u64; 6],
    /// `attacks_bb[color][pt.index()]`: every square a piece of type
    /// `pt` belonging to `color` currently attacks, unioned across
    /// all pieces of that type/color. Recomputed from scratch
    /// alongside `checkers_bb`/`blockers_bb`; used by move scoring.
    pub attacks_bb: [[u64; 6]; 2],
    /// Ply distance back to the most recent position with an equal
    /// key, within the current unbroken (irreversible-move-free)
    /// run; 0 if none found.
    pub repetition: i32,
}

impl State {
    pub fn empty() -> Self {
        Self {
            key: 0,
            pawn_key: 0,
            non_pawn_key: [[0; 2]; 2],
            castling_rights: CastlingRights::NONE,
            en_passant: SQUARE_NONE,
            rule50: 0,
            null_ply: 0,
            has_rule50_high: false,
            captured: NO_PIECE,
            checkers_bb: 0,
            blockers_bb: [0; 2],
            pinners_bb: [0; 2],
            check_squares: [0; 6],
            attacks_bb: [[0; 6]; 2],
            repetition: 0,
        }
    }
}
