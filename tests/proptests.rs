//! Property-based tests using proptest, grounded on the teacher's
//! `board/tests/proptest.rs` (random move sequence + invariant check
//! pattern), scoped down to this crate's own surface (no search, no
//! evaluation).

use chess_core::position::movegen;
use chess_core::position::see;
use chess_core::tt::{Bound, TranspositionTable};
use chess_core::types::PieceType;
use chess_core::Position;
use proptest::prelude::*;

fn seed_strategy() -> impl Strategy<Value = u64> {
    any::<u64>()
}

fn piece_value(pt: PieceType) -> i32 {
    match pt {
        PieceType::Pawn => 100,
        PieceType::Knight => 320,
        PieceType::Bishop => 330,
        PieceType::Rook => 500,
        PieceType::Queen => 900,
        PieceType::King | PieceType::None => 0,
    }
}

proptest! {
    /// make then unmake a random legal sequence restores the FEN exactly.
    #[test]
    fn prop_make_unmake_restores_fen(seed in seed_strategy(), num_moves in 0..20usize) {
        use rand::prelude::*;

        let mut pos = Position::startpos();
        let mut rng = StdRng::seed_from_u64(seed);
        let starting_fen = pos.fen();
        let mut played = Vec::new();

        for _ in 0..num_moves {
            let moves = movegen::legal(&mut pos);
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            pos.do_move(mv);
            played.push(mv);
        }

        while let Some(mv) = played.pop() {
            pos.undo_move(mv);
        }

        prop_assert_eq!(pos.fen(), starting_fen);
    }

    /// FEN round-trips after a random walk of legal moves.
    #[test]
    fn prop_fen_roundtrip_after_random_walk(seed in seed_strategy(), num_moves in 0..20usize) {
        use rand::prelude::*;

        let mut pos = Position::startpos();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let moves = movegen::legal(&mut pos);
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            pos.do_move(mv);
        }

        let fen = pos.fen();
        let restored = Position::from_fen(&fen).expect("fen produced by this crate parses back");
        prop_assert_eq!(restored.fen(), fen);
    }

    /// legal moves never leave the mover's own king in check.
    #[test]
    fn prop_legal_moves_never_self_check(seed in seed_strategy()) {
        use rand::prelude::*;

        let mut pos = Position::startpos();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..10 {
            let moves = movegen::legal(&mut pos);
            if moves.is_empty() {
                break;
            }
            for mv in &moves {
                let mover = pos.side_to_move();
                let mut copy = pos.clone();
                copy.do_move(*mv);
                prop_assert!(!copy.is_attacked_by(copy.king_square(mover), !mover));
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            pos.do_move(mv);
        }
    }

    /// SEE of a capture never exceeds the captured piece's value.
    #[test]
    fn prop_see_bounded_by_victim_value(seed in seed_strategy(), num_moves in 0..15usize) {
        use rand::prelude::*;

        let mut pos = Position::startpos();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let moves = movegen::legal(&mut pos);
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            pos.do_move(mv);
        }

        for mv in movegen::legal(&mut pos) {
            let victim = pos.piece_on(mv.to());
            if victim.piece_type != PieceType::None {
                let gain = see::see(&pos, mv);
                prop_assert!(gain <= piece_value(victim.piece_type));
            }
        }
    }

    /// the transposition table returns exactly what was stored, modulo the
    /// score/depth clamping the packed representation performs.
    #[test]
    fn prop_tt_store_then_probe(
        key in any::<u64>(),
        depth in 0u8..=255,
        score in -32_000i32..32_000,
    ) {
        let tt = TranspositionTable::new(1);
        tt.store(key, depth, Bound::Exact, false, score as i16, None);

        if let Some(entry) = tt.probe(key) {
            prop_assert_eq!(entry.depth, depth);
            prop_assert_eq!(entry.score, score as i16);
        }
        // a miss is acceptable: two keys can share a cluster slot.
    }
}
