//! Perft and attack-table micro-benchmarks.
//!
//! Grounded on the teacher's `benches/engine_benchmarks.rs` layout
//! (one `criterion_group`/`criterion_main` per translation unit), with
//! the benchmarked operations swapped for this crate's own surface.

use chess_core::magic;
use chess_core::position::movegen;
use chess_core::position::Position;
use chess_core::types::Square;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_perft(c: &mut Criterion) {
    let mut pos = Position::startpos();
    c.bench_function("perft depth 3 from startpos", |b| {
        b.iter(|| black_box(movegen::perft(&mut pos, 3)));
    });
}

fn bench_legal_movegen(c: &mut Criterion) {
    let mut pos = Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    c.bench_function("legal move generation on kiwipete", |b| {
        b.iter(|| black_box(movegen::legal(&mut pos)));
    });
}

fn bench_magic_attacks(c: &mut Criterion) {
    let sq = Square::from_coord("d4").unwrap();
    let occupied = 0x0000_1818_0000_0000u64;
    c.bench_function("rook attacks via magic table", |b| {
        b.iter(|| black_box(magic::rook_attacks(sq, occupied)));
    });
    c.bench_function("bishop attacks via magic table", |b| {
        b.iter(|| black_box(magic::bishop_attacks(sq, occupied)));
    });
}

criterion_group!(benches, bench_perft, bench_legal_movegen, bench_magic_attacks);
criterion_main!(benches);
