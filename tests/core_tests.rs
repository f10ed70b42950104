//! End-to-end tests over the public crate surface: FEN round-trips,
//! perft at a few plies, and the two fixed-point constants (KPK win
//! count, cuckoo table size) that only make sense checked as a whole.

use chess_core::kpk;
use chess_core::position::movegen;
use chess_core::position::repetition::cuckoo_entry_count;
use chess_core::position::see;
use chess_core::types::{Color, Move, MoveKind, Square};
use chess_core::Position;

#[test]
fn fen_round_trips_through_a_handful_of_positions() {
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
    ];
    for fen in fens {
        let pos = Position::from_fen(fen).expect("well-formed FEN parses");
        assert_eq!(pos.fen(), fen);
    }
}

#[test]
fn perft_matches_well_known_node_counts_from_startpos() {
    let mut pos = Position::startpos();
    assert_eq!(movegen::perft(&mut pos, 1), 20);
    assert_eq!(movegen::perft(&mut pos, 2), 400);
    assert_eq!(movegen::perft(&mut pos, 3), 8_902);
}

#[test]
fn perft_matches_kiwipete_at_depth_one() {
    let mut pos = Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    assert_eq!(movegen::perft(&mut pos, 1), 48);
}

#[test]
fn kpk_win_count_matches_the_known_total() {
    assert_eq!(kpk::win_count(), 111_282);
}

#[test]
fn cuckoo_table_size_matches_the_known_total() {
    assert_eq!(cuckoo_entry_count(), 3_668);
}

#[test]
fn knight_shuffle_triggers_threefold_repetition_across_do_move() {
    let mut pos = Position::startpos();
    for (from, to) in [
        ("g1", "f3"),
        ("g8", "f6"),
        ("f3", "g1"),
        ("f6", "g8"),
        ("g1", "f3"),
        ("g8", "f6"),
        ("f3", "g1"),
        ("f6", "g8"),
    ] {
        let m = Move::new(Square::from_coord(from).unwrap(), Square::from_coord(to).unwrap(), MoveKind::Normal, None);
        pos.do_move(m);
    }
    assert!(pos.is_threefold_repetition());
}

#[test]
fn scholars_mate_is_checkmate() {
    let mut pos = Position::startpos();
    for (from, to) in [
        ("e2", "e4"),
        ("e7", "e5"),
        ("d1", "h5"),
        ("b8", "c6"),
        ("f1", "c4"),
        ("g8", "f6"),
        ("h5", "f7"),
    ] {
        let m = Move::new(Square::from_coord(from).unwrap(), Square::from_coord(to).unwrap(), MoveKind::Normal, None);
        pos.do_move(m);
    }
    assert!(pos.is_checkmate());
}

#[test]
fn make_then_unmake_every_reply_restores_the_starting_fen() {
    let mut pos = Position::startpos();
    let starting_fen = pos.fen();
    for m in movegen::legal(&mut pos) {
        let mut copy = pos.clone();
        copy.do_move(m);
        copy.undo_move(m);
        assert_eq!(copy.fen(), starting_fen);
    }
}

#[test]
fn see_of_a_free_pawn_capture_matches_the_pawn_value() {
    let pos = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
    let m = Move::new(Square::from_coord("e4").unwrap(), Square::from_coord("d5").unwrap(), MoveKind::Normal, None);
    assert_eq!(see::see(&pos, m), 100);
}

#[test]
fn insufficient_material_draws_with_bare_kings() {
    let pos = Position::from_fen("8/8/4k3/8/8/4K3/8/8 w - - 0 1").unwrap();
    assert!(pos.is_insufficient_material());
}

#[test]
fn stalemate_is_not_checkmate() {
    let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(pos.is_stalemate());
    assert!(!pos.is_checkmate());
}

#[test]
fn side_to_move_after_startpos_push_is_black() {
    let mut pos = Position::startpos();
    let m = Move::new(Square::from_coord("e2").unwrap(), Square::from_coord("e4").unwrap(), MoveKind::Normal, None);
    pos.do_move(m);
    assert_eq!(pos.side_to_move(), Color::Black);
}
