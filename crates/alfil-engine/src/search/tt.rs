//! Transposition table: fixed-capacity, direct-mapped, depth-preferred.
//!
//! Slots are indexed by the low bits of the Zobrist hash. Collisions between
//! different positions sharing a full 64-bit hash are not detected.

use alfil_core::Move;

use crate::search::MATE_THRESHOLD;

/// Bound type stored in a TT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The stored score is exact (PV node).
    Exact,
    /// The stored score is a lower bound (failed high / beta cutoff).
    LowerBound,
    /// The stored score is an upper bound (failed low / all-node).
    UpperBound,
}

/// One cached search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub hash: u64,
    pub depth: i32,
    /// Score relative to the probing node once returned by [`TranspositionTable::lookup`].
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

impl TtEntry {
    /// The score to return instead of searching, if this entry settles the node.
    pub fn cutoff(&self, depth: i32, alpha: i32, beta: i32) -> Option<i32> {
        if self.depth < depth {
            return None;
        }
        let usable = match self.bound {
            Bound::Exact => true,
            Bound::LowerBound => self.score >= beta,
            Bound::UpperBound => self.score <= alpha,
        };
        usable.then_some(self.score)
    }
}

/// Convert a search score to TT-storable form.
///
/// Mate scores are path-dependent: `MATE_SCORE - ply` changes based on
/// the search path. We store them as distance-from-node instead of
/// distance-from-root so they're path-independent.
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Convert a TT-stored score back to search-usable form.
///
/// Reverses the mate-distance adjustment applied by [`score_to_tt`].
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

pub struct TranspositionTable {
    slots: Vec<Option<TtEntry>>,
    mask: usize,
}

impl TranspositionTable {
    /// Create a table with `entries` slots, rounded down to a power of two.
    pub fn new(entries: usize) -> Self {
        let capacity = floor_power_of_two(entries.max(1));
        Self {
            slots: vec![None; capacity],
            mask: capacity - 1,
        }
    }

    /// Create a table occupying roughly `mb` megabytes.
    pub fn with_megabytes(mb: usize) -> Self {
        let bytes = mb.max(1) * 1024 * 1024;
        Self::new(bytes / std::mem::size_of::<Option<TtEntry>>())
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Probe for `hash`, re-basing mate scores to `ply`.
    pub fn lookup(&self, hash: u64, ply: usize) -> Option<TtEntry> {
        let entry = self.slots[self.index(hash)]?;
        (entry.hash == hash).then(|| TtEntry {
            score: score_from_tt(entry.score, ply),
            ..entry
        })
    }

    /// Store a result searched at `ply`.
    ///
    /// An occupied slot holding a different position searched deeper is kept.
    pub fn store(
        &mut self,
        hash: u64,
        depth: i32,
        score: i32,
        bound: Bound,
        best_move: Option<Move>,
        ply: usize,
    ) {
        let index = self.index(hash);
        if let Some(existing) = &self.slots[index]
            && existing.hash != hash
            && existing.depth > depth
        {
            return;
        }
        self.slots[index] = Some(TtEntry {
            hash,
            depth,
            score: score_to_tt(score, ply),
            bound,
            best_move,
        });
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    /// Occupancy in permille, sampled over the first thousand slots.
    pub fn hashfull(&self) -> u32 {
        let sample = self.slots.len().min(1000);
        let used = self.slots[..sample].iter().filter(|s| s.is_some()).count();
        (used * 1000 / sample) as u32
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("capacity", &self.slots.len())
            .finish()
    }
}

fn floor_power_of_two(n: usize) -> usize {
    1 << (usize::BITS - 1 - n.leading_zeros())
}
