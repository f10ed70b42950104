//! Lock-free transposition table.
//!
//! Grounded on the teacher's `tt.rs` cluster-of-four-entries layout
//! and depth/age replacement priority, generalized from a
//! `&mut self`/`Vec<[Option<TTEntry>; 4]>` table guarded by a mutex at
//! the caller into one that can be probed and stored into from
//! multiple search threads without any lock. Each entry packs its
//! payload into a single `u64` and publishes it XORed with the
//! Zobrist key into a second `u64` (the classic lockless-hashing
//! trick: a half-written entry from a torn concurrent write decodes
//! to a key that doesn't match on the next probe and is treated as a
//! miss, rather than read as a corrupted hit).

use crate::types::{Move, MoveKind, PieceType, Square};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// How a stored score relates to the true minimax value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

impl Bound {
    const fn to_bits(self) -> u64 {
        match self {
            Self::Exact => 0,
            Self::Lower => 1,
            Self::Upper => 2,
        }
    }

    const fn from_bits(bits: u64) -> Self {
        match bits & 0x3 {
            1 => Self::Lower,
            2 => Self::Upper,
            _ => Self::Exact,
        }
    }
}

/// A reconstructed probe hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub depth: u8,
    pub bound: Bound,
    pub pv: bool,
    pub score: i16,
    pub best_move: Option<Move>,
    pub generation: u8,
}

const MOVE_SHIFT: u64 = 0;
const SCORE_SHIFT: u64 = 16;
const DEPTH_SHIFT: u64 = 32;
const BOUND_SHIFT: u64 = 40;
const PV_SHIFT: u64 = 42;
const GEN_SHIFT: u64 = 43;
const OCCUPIED_BIT: u64 = 1 << 51;

fn pack_move(m: Option<Move>) -> u64 {
    m.map_or(0, |mv| mv.0 as u64)
}

fn unpack_move(bits: u64) -> Option<Move> {
    let raw = (bits & 0xffff) as u16;
    if raw == 0 {
        None
    } else {
        Some(Move(raw))
    }
}

fn pack(depth: u8, bound: Bound, pv: bool, score: i16, best_move: Option<Move>, generation: u8) -> u64 {
    OCCUPIED_BIT
        | (pack_move(best_move) << MOVE_SHIFT)
        | ((score as u16 as u64) << SCORE_SHIFT)
        | ((depth as u64) << DEPTH_SHIFT)
        | (bound.to_bits() << BOUND_SHIFT)
        | ((pv as u64) << PV_SHIFT)
        | ((generation as u64) << GEN_SHIFT)
}

fn unpack(data: u64) -> Entry {
    Entry {
        depth: ((data >> DEPTH_SHIFT) & 0xff) as u8,
        bound: Bound::from_bits(data >> BOUND_SHIFT),
        pv: (data >> PV_SHIFT) & 1 != 0,
        score: ((data >> SCORE_SHIFT) & 0xffff) as u16 as i16,
        best_move: unpack_move(data),
        generation: ((data >> GEN_SHIFT) & 0xff) as u8,
    }
}

struct Slot {
    key: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    const fn empty() -> Self {
        Self { key: AtomicU64::new(0), data: AtomicU64::new(0) }
    }
}

const CLUSTER_SIZE: usize = 4;

struct Cluster {
    slots: [Slot; CLUSTER_SIZE],
}

impl Cluster {
    fn empty() -> Self {
        Self { slots: [Slot::empty(), Slot::empty(), Slot::empty(), Slot::empty()] }
    }
}

/// A transposition table sized in megabytes, safe to probe and store
/// into concurrently from any number of search threads.
pub struct TranspositionTable {
    clusters: Vec<Cluster>,
    mask: usize,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Builds a table sized to the nearest power-of-two cluster count
    /// that fits in `size_mb` megabytes (minimum one cluster).
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let cluster_bytes = std::mem::size_of::<Cluster>().max(1);
        let mut num_clusters = (bytes / cluster_bytes).next_power_of_two();
        if num_clusters == 0 {
            num_clusters = 1;
        }
        let mut clusters = Vec::with_capacity(num_clusters);
        clusters.resize_with(num_clusters, Cluster::empty);
        Self { clusters, mask: num_clusters - 1, generation: AtomicU8::new(0) }
    }

    fn cluster_index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    /// Starts a new search: bumps the generation used to age out
    /// stale entries during replacement, without clearing any data.
    pub fn new_search(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    fn current_generation(&self) -> u8 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Looks up `key`, returning the stored entry if a slot's
    /// published `key ^ data` decodes back to `key` and the slot is
    /// marked occupied. A hit refreshes the slot's generation to the
    /// current search's, keeping the bound/move/score untouched, so an
    /// entry a later search keeps revisiting doesn't age out of a
    /// replacement race against genuinely stale ones.
    #[must_use]
    pub fn probe(&self, key: u64) -> Option<Entry> {
        let cluster = &self.clusters[self.cluster_index(key)];
        for slot in &cluster.slots {
            let data = slot.data.load(Ordering::Relaxed);
            let stored_key = slot.key.load(Ordering::Relaxed) ^ data;
            if stored_key == key && data & OCCUPIED_BIT != 0 {
                let mut entry = unpack(data);
                let current = self.current_generation();
                if entry.generation != current {
                    let refreshed = (data & !(0xffu64 << GEN_SHIFT)) | ((current as u64) << GEN_SHIFT);
                    slot.data.store(refreshed, Ordering::Relaxed);
                    slot.key.store(key ^ refreshed, Ordering::Relaxed);
                    entry.generation = current;
                }
                return Some(entry);
            }
        }
        None
    }

    /// Stores a result for `key`, replacing whichever slot in the
    /// cluster already holds `key`, else the first empty slot, else
    /// the slot with the lowest `depth - 2*age` priority. Overwriting
    /// an exact-key match with `best_move: None` keeps the
    /// previously-stored move rather than discarding it.
    pub fn store(&self, key: u64, depth: u8, bound: Bound, pv: bool, score: i16, best_move: Option<Move>) {
        let generation = self.current_generation();
        let cluster = &self.clusters[self.cluster_index(key)];

        for slot in &cluster.slots {
            let existing_data = slot.data.load(Ordering::Relaxed);
            let existing_key = slot.key.load(Ordering::Relaxed) ^ existing_data;
            let is_match = existing_data & OCCUPIED_BIT != 0 && existing_key == key;
            if existing_data & OCCUPIED_BIT == 0 || is_match {
                let move_to_store = best_move.or_else(|| if is_match { unpack_move(existing_data) } else { None });
                let data = pack(depth, bound, pv, score, move_to_store, generation);
                slot.data.store(data, Ordering::Relaxed);
                slot.key.store(key ^ data, Ordering::Relaxed);
                return;
            }
        }

        let mut replace = 0usize;
        let mut worst_priority = i32::MAX;
        for (idx, slot) in cluster.slots.iter().enumerate() {
            let existing_data = slot.data.load(Ordering::Relaxed);
            let existing = unpack(existing_data);
            let age = generation.wrapping_sub(existing.generation);
            let priority = (existing.depth as i32) * 2 - (age as i32);
            if idx == 0 || priority < worst_priority {
                worst_priority = priority;
                replace = idx;
            }
        }
        let slot = &cluster.slots[replace];
        slot.data.store(data, Ordering::Relaxed);
        slot.key.store(key ^ data, Ordering::Relaxed);
    }

    /// Approximate per-mille occupancy, sampled over the first 1000
    /// clusters (or all of them, if fewer) — matches the teacher's
    /// `hashfull_per_mille` intent without an exact occupied counter,
    /// which a lock-free table has no cheap way to keep precise.
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let sample = self.clusters.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let mut occupied = 0u32;
        for cluster in &self.clusters[..sample] {
            for slot in &cluster.slots {
                if slot.data.load(Ordering::Relaxed) & OCCUPIED_BIT != 0 {
                    occupied += 1;
                }
            }
        }
        (occupied as u64 * 1000 / (sample as u64 * CLUSTER_SIZE as u64)) as u32
    }

    /// Drops every stored entry, keeping the current allocation.
    pub fn clear(&mut self) {
        for cluster in &mut self.clusters {
            for slot in &mut cluster.slots {
                slot.key.store(0, Ordering::Relaxed);
                slot.data.store(0, Ordering::Relaxed);
            }
        }
        self.generation.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_move() -> Move {
        Move::new(Square::from_coord("e2").unwrap(), Square::from_coord("e4").unwrap(), MoveKind::Normal, None)
    }

    #[test]
    fn store_then_probe_round_trips() {
        let tt = TranspositionTable::new(1);
        tt.store(0xdead_beef, 12, Bound::Exact, true, 57, Some(sample_move()));
        let entry = tt.probe(0xdead_beef).expect("entry should be present");
        assert_eq!(entry.depth, 12);
        assert_eq!(entry.bound, Bound::Exact);
        assert!(entry.pv);
        assert_eq!(entry.score, 57);
        assert_eq!(entry.best_move, Some(sample_move()));
    }

    #[test]
    fn probe_miss_on_unseen_key() {
        let tt = TranspositionTable::new(1);
        tt.store(1, 4, Bound::Lower, false, -20, None);
        assert!(tt.probe(2).is_none());
    }

    #[test]
    fn new_search_ages_entries_used_by_replacement_priority() {
        let tt = TranspositionTable::new(1);
        tt.store(10, 1, Bound::Exact, false, 0, None);
        tt.new_search();
        tt.new_search();
        // a probe hit refreshes the slot's generation to the current search,
        // so a still-relevant entry doesn't read as stale on its own lookup.
        let entry = tt.probe(10).unwrap();
        assert_eq!(entry.generation, 2);
    }

    #[test]
    fn store_with_no_move_preserves_a_previously_stored_move() {
        let tt = TranspositionTable::new(1);
        tt.store(42, 8, Bound::Exact, false, 10, Some(sample_move()));
        tt.store(42, 9, Bound::Lower, false, 15, None);
        let entry = tt.probe(42).unwrap();
        assert_eq!(entry.depth, 9);
        assert_eq!(entry.bound, Bound::Lower);
        assert_eq!(entry.best_move, Some(sample_move()));
    }

    #[test]
    fn clear_removes_every_entry() {
        let mut tt = TranspositionTable::new(1);
        tt.store(99, 3, Bound::Upper, false, 5, None);
        tt.clear();
        assert!(tt.probe(99).is_none());
    }
}
