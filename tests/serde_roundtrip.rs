//! Serde round-trip of the plain value types, exercised only when the
//! `serde` feature is enabled (`cargo test --features serde`).

#![cfg(feature = "serde")]

use chess_core::types::{Color, Piece, PieceType};

#[test]
fn piece_round_trips_through_json() {
    let piece = Piece::new(Color::Black, PieceType::Knight);
    let json = serde_json::to_string(&piece).unwrap();
    let restored: Piece = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, piece);
}
