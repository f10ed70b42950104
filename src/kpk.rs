//! King and pawn vs king bitbase.
//!
//! A direct port of the retrograde fixed-point solve used across the
//! open-source engine ecosystem (the `Bitbases::init` approach): every
//! reachable (side to move, stronger king, weaker king, pawn square)
//! tuple is classified win/draw/invalid by immediate rules, then
//! repeatedly reclassified from its successors until nothing changes.
//! The table always settles because each pass can only turn `Unknown`
//! into something else, never back.
//!
//! Throughout, "white" means the side with the pawn, pushing toward
//! rank 8; a caller whose actual stronger side is black, or whose pawn
//! sits on a file east of `d`, mirrors the position before calling
//! [`probe`] (see its doc comment).

use crate::bitboard::{self, Bitboard};
use crate::types::{Color, File, Rank, Square};
use once_cell::sync::Lazy;

/// Classification result. Values double as bit flags so `classify`
/// can accumulate "at least one successor is winning" /
/// "at least one successor is still unknown" in a single byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Outcome(u8);

impl Outcome {
    const INVALID: Self = Self(0);
    const UNKNOWN: Self = Self(1);
    const DRAW: Self = Self(2);
    const WIN: Self = Self(4);

    #[must_use]
    fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 != 0
    }

    #[must_use]
    fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Total number of (pawn square, stronger king, weaker king, side to
/// move) tuples, with the pawn's file already normalized to `a..d`
/// (files `e..h` are a mirror image) and its rank to `2..7` (a pawn
/// can never sit on rank 1 or 8). `2 * 24 * 64 * 64`.
const MAX_INDEX: usize = 2 * 24 * 64 * 64;

/// Maps a normalized pawn square (file `0..4`, rank `1..7` i.e. ranks
/// 2..7) to `0..24`.
fn pawn_index(psq: Square) -> usize {
    let file = psq.file().0 as usize;
    let rank = psq.rank().0 as usize;
    debug_assert!(file < 4, "pawn file must be normalized to a..d");
    debug_assert!((1..=6).contains(&rank), "pawn must be on rank 2..7");
    file + 4 * (rank - 1)
}

fn index(stm: Color, strong_ksq: Square, weak_ksq: Square, psq: Square) -> usize {
    stm.index() + 2 * (pawn_index(psq) + 24 * (strong_ksq.index() + 64 * weak_ksq.index()))
}

#[derive(Clone, Copy)]
struct Position {
    stm: Color,
    strong_ksq: Square,
    weak_ksq: Square,
    psq: Square,
}

fn square_north(sq: Square) -> Square {
    Square(sq.0 + 8)
}

fn classify_initial(pos: Position) -> Outcome {
    let Position { stm, strong_ksq, weak_ksq, psq } = pos;

    let kings_adjacent_or_overlapping = crate::types::king_distance(strong_ksq, weak_ksq) <= 1;
    let king_on_pawn_square = strong_ksq == psq || weak_ksq == psq;
    let pawn_attacks_weak_king =
        stm == Color::White && bitboard::PAWN_ATTACKS[Color::White.index()][psq.index()] & bitboard::square_bb(weak_ksq) != 0;

    if kings_adjacent_or_overlapping || king_on_pawn_square || pawn_attacks_weak_king {
        return Outcome::INVALID;
    }

    if stm == Color::White && psq.rank() == Rank::R7 {
        let promo = square_north(psq);
        if strong_ksq != promo {
            let king_too_far = crate::types::king_distance(weak_ksq, promo) > 1;
            let strong_king_guards = bitboard::KING_ATTACKS[strong_ksq.index()] & bitboard::square_bb(promo) != 0;
            if king_too_far || strong_king_guards {
                return Outcome::WIN;
            }
        }
    }

    if stm == Color::Black {
        let weak_moves = bitboard::KING_ATTACKS[weak_ksq.index()];
        let forbidden = bitboard::KING_ATTACKS[strong_ksq.index()] | bitboard::PAWN_ATTACKS[Color::White.index()][psq.index()];
        let stalemated = weak_moves & !forbidden == 0;
        let can_take_pawn =
            weak_moves & bitboard::square_bb(psq) != 0 && bitboard::KING_ATTACKS[strong_ksq.index()] & bitboard::square_bb(psq) == 0;
        if stalemated || can_take_pawn {
            return Outcome::DRAW;
        }
    }

    Outcome::UNKNOWN
}

fn classify(pos: Position, db: &[Outcome]) -> Outcome {
    let Position { stm, strong_ksq, weak_ksq, psq } = pos;
    let (good, bad) = if stm == Color::White { (Outcome::WIN, Outcome::DRAW) } else { (Outcome::DRAW, Outcome::WIN) };

    let mut r = Outcome::INVALID;
    let mut moves = bitboard::KING_ATTACKS[if stm == Color::White { strong_ksq } else { weak_ksq }.index()];
    while moves != 0 {
        let dest = bitboard::pop_lsb(&mut moves);
        let successor = if stm == Color::White {
            Position { stm: Color::Black, strong_ksq: dest, weak_ksq, psq }
        } else {
            Position { stm: Color::White, strong_ksq, weak_ksq: dest, psq }
        };
        r = r.union(db[index(successor.stm, successor.strong_ksq, successor.weak_ksq, successor.psq)]);
    }

    if stm == Color::White {
        if psq.rank() != Rank::R7 {
            let pushed = Position { stm: Color::Black, strong_ksq, weak_ksq, psq: square_north(psq) };
            r = r.union(db[index(pushed.stm, pushed.strong_ksq, pushed.weak_ksq, pushed.psq)]);
        }
        if psq.rank() == Rank::R2 {
            let double = square_north(square_north(psq));
            if double != strong_ksq && double != weak_ksq {
                let pushed = Position { stm: Color::Black, strong_ksq, weak_ksq, psq: double };
                r = r.union(db[index(pushed.stm, pushed.strong_ksq, pushed.weak_ksq, pushed.psq)]);
            }
        }
    }

    if r.contains(good) {
        good
    } else if r.contains(Outcome::UNKNOWN) {
        Outcome::UNKNOWN
    } else {
        bad
    }
}

struct Bitbase {
    bits: Vec<u64>,
    win_count: usize,
}

fn build() -> Bitbase {
    let mut db = vec![Outcome::INVALID; MAX_INDEX];

    for strong_ksq in 0..64u8 {
        for weak_ksq in 0..64u8 {
            for file in 0..4u8 {
                for rank in 1..=6u8 {
                    for stm in [Color::White, Color::Black] {
                        let psq = Square::new(File(file), Rank(rank));
                        let pos = Position { stm, strong_ksq: Square(strong_ksq), weak_ksq: Square(weak_ksq), psq };
                        let idx = index(stm, pos.strong_ksq, pos.weak_ksq, psq);
                        db[idx] = classify_initial(pos);
                    }
                }
            }
        }
    }

    loop {
        let mut changed = false;
        for strong_ksq in 0..64u8 {
            for weak_ksq in 0..64u8 {
                for file in 0..4u8 {
                    for rank in 1..=6u8 {
                        for stm in [Color::White, Color::Black] {
                            let psq = Square::new(File(file), Rank(rank));
                            let pos = Position { stm, strong_ksq: Square(strong_ksq), weak_ksq: Square(weak_ksq), psq };
                            let idx = index(stm, pos.strong_ksq, pos.weak_ksq, psq);
                            if db[idx] == Outcome::UNKNOWN {
                                let next = classify(pos, &db);
                                if next != Outcome::UNKNOWN {
                                    db[idx] = next;
                                    changed = true;
                                }
                            }
                        }
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    let mut bits = vec![0u64; MAX_INDEX.div_ceil(64)];
    let mut win_count = 0usize;
    for (idx, outcome) in db.iter().enumerate() {
        if *outcome == Outcome::WIN {
            bits[idx / 64] |= 1u64 << (idx % 64);
            win_count += 1;
        }
    }

    Bitbase { bits, win_count }
}

static BITBASE: Lazy<Bitbase> = Lazy::new(build);

/// Forces the bitbase to build now instead of on first [`probe`] call.
pub fn init() {
    Lazy::force(&BITBASE);
}

/// Number of (pawn square, strong king, weak king, side to move)
/// tuples classified as a win for the side with the pawn.
#[must_use]
pub fn win_count() -> usize {
    BITBASE.win_count
}

/// `true` if this king-and-pawn-vs-king position is won for the side
/// with the pawn, assuming optimal play by both sides.
///
/// `strong_ksq`/`weak_ksq`/`pawn_sq` and `stm` must already be in the
/// bitbase's normal form: the pawn pushes toward rank 8 (mirror the
/// whole position vertically and swap `stm` if the actual pawn side
/// is black), and the pawn's file is `a..d` (mirror horizontally,
/// `Square::mirror_file`, if it's actually `e..h`).
#[must_use]
pub fn probe(stm: Color, strong_ksq: Square, weak_ksq: Square, pawn_sq: Square) -> bool {
    debug_assert!(pawn_sq.file().0 < 4, "pawn_sq must be normalized to files a..d");
    debug_assert!((1..=6).contains(&pawn_sq.rank().0), "pawn_sq must be on rank 2..7");
    let idx = index(stm, strong_ksq, weak_ksq, pawn_sq);
    BITBASE.bits[idx / 64] & (1u64 << (idx % 64)) != 0
}

/// Normalizes `(strong_ksq, weak_ksq, pawn_sq)` so the pawn's file is
/// `a..d`, mirroring all three squares horizontally if it isn't.
#[must_use]
pub fn normalize_file(strong_ksq: Square, weak_ksq: Square, pawn_sq: Square) -> (Square, Square, Square) {
    if pawn_sq.file().0 < 4 {
        (strong_ksq, weak_ksq, pawn_sq)
    } else {
        (strong_ksq.mirror_file(), weak_ksq.mirror_file(), pawn_sq.mirror_file())
    }
}
