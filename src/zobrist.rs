//! Zobrist key material: fixed-seed random tables, XORed incrementally
//! by `position::make_unmake` rather than recomputed from scratch.
//!
//! Grounded on the teacher's `zobrist.rs`: a `once_cell`/`LazyLock`
//! static seeded from a fixed constant so two runs of the engine (and
//! every test in this crate) see the same keys.

use crate::types::{CastlingRights, Color, File, Piece, PieceType, Square};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Same fixed seed the teacher's zobrist table uses, kept so that any
/// persisted TT or PolyGlot fixture the teacher produced stays valid.
const ZOBRIST_SEED: u64 = 1_234_567_890;

pub struct ZobristKeys {
    /// `piece[color][piece_type][square]`, indexed with `PieceType::index()`
    /// (the `None` slot, index 6, is never read).
    piece: [[[u64; 64]; 7]; 2],
    castling: [u64; 16],
    en_passant: [u64; 8],
    turn: u64,
    /// Extra entropy folded into the TT key so that two otherwise
    /// identical positions differing only in the halfmove clock hash
    /// differently once the clock nears the 50-move cutoff (spec.md
    /// §4.10's replacement-safety note).
    mr50: [u64; 128],
}

impl ZobristKeys {
    fn build() -> Self {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        let mut piece = [[[0u64; 64]; 7]; 2];
        for color_keys in piece.iter_mut() {
            for (pt, pt_keys) in color_keys.iter_mut().enumerate() {
                if pt == PieceType::None.index() {
                    continue;
                }
                for key in pt_keys.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        let mut castling = [0u64; 16];
        for key in castling.iter_mut() {
            *key = rng.gen();
        }
        let mut en_passant = [0u64; 8];
        for key in en_passant.iter_mut() {
            *key = rng.gen();
        }
        let turn = rng.gen();
        let mut mr50 = [0u64; 128];
        for key in mr50.iter_mut() {
            *key = rng.gen();
        }
        Self { piece, castling, en_passant, turn, mr50 }
    }

    #[inline]
    #[must_use]
    pub fn piece_key(&self, piece: Piece, sq: Square) -> u64 {
        debug_assert!(!piece.is_none());
        self.piece[piece.color.index()][piece.piece_type.index()][sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn castling_key(&self, rights: CastlingRights) -> u64 {
        self.castling[(rights.0 & 0b1111) as usize]
    }

    #[inline]
    #[must_use]
    pub fn en_passant_key(&self, file: File) -> u64 {
        self.en_passant[file.0 as usize]
    }

    #[inline]
    #[must_use]
    pub fn turn_key(&self) -> u64 {
        self.turn
    }

    #[inline]
    #[must_use]
    pub fn rule50_key(&self, rule50_count: u32) -> u64 {
        self.mr50[(rule50_count as usize).min(self.mr50.len() - 1)]
    }
}

pub static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::build);

/// Non-pawn material key bucket: `major` covers rook/queen, as the
/// teacher's incremental king-safety keys split minors from majors.
#[must_use]
pub fn is_major(piece_type: PieceType) -> bool {
    matches!(piece_type, PieceType::Rook | PieceType::Queen)
}

#[must_use]
pub fn is_minor(piece_type: PieceType) -> bool {
    matches!(piece_type, PieceType::Knight | PieceType::Bishop)
}

/// Which `non_pawn_key[color][bucket]` slot a non-pawn, non-king piece
/// folds into: `0` for minors (knight/bishop), `1` for majors (rook/queen).
#[must_use]
pub fn non_pawn_bucket(piece_type: PieceType) -> usize {
    debug_assert!(is_minor(piece_type) || is_major(piece_type));
    usize::from(is_major(piece_type))
}
