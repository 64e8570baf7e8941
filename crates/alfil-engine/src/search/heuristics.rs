//! Killer move table and history heuristic for quiet move ordering.

use alfil_core::{Move, Piece};

use crate::search::MAX_PLY;

/// Two killer moves per ply: quiet moves that caused beta cutoffs.
pub struct KillerTable {
    slots: [[Option<Move>; 2]; MAX_PLY],
}

impl KillerTable {
    /// Create an empty killer table.
    pub fn new() -> Self {
        Self {
            slots: [[None; 2]; MAX_PLY],
        }
    }

    /// Store a killer move at the given ply.
    ///
    /// Shifts slot 0 to slot 1 if the new move differs from slot 0, so the
    /// older of the two is evicted.
    pub fn store(&mut self, ply: usize, mv: Move) {
        let Some(slots) = self.slots.get_mut(ply) else {
            return;
        };
        if slots[0] != Some(mv) {
            slots[1] = slots[0];
            slots[0] = Some(mv);
        }
    }

    /// Which slot holds `mv` at `ply`, 0 being the most recent.
    pub fn slot_of(&self, ply: usize, mv: Move) -> Option<usize> {
        self.slots
            .get(ply)?
            .iter()
            .position(|&killer| killer == Some(mv))
    }

    pub fn is_killer(&self, ply: usize, mv: Move) -> bool {
        self.slot_of(ply, mv).is_some()
    }

    pub fn clear(&mut self) {
        self.slots = [[None; 2]; MAX_PLY];
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Maximum value for history scores, kept below the killer band.
pub const HISTORY_MAX: i32 = 8_000;

/// History heuristic table, indexed by `[piece][to_square]`.
///
/// Rewards quiet moves that cause beta cutoffs. Lives for a whole game.
pub struct HistoryTable {
    table: [[i32; 64]; 12],
}

impl HistoryTable {
    /// Create a zeroed history table.
    pub fn new() -> Self {
        Self {
            table: [[0; 64]; 12],
        }
    }

    /// Reward a quiet move that caused a beta cutoff at `depth`.
    pub fn reward(&mut self, piece: Piece, to: usize, depth: i32) {
        let bonus = depth.max(0).saturating_mul(depth.max(0));
        let entry = &mut self.table[piece.index()][to];
        *entry = entry.saturating_add(bonus).min(HISTORY_MAX);
    }

    /// Get the history score for a quiet move.
    pub fn score(&self, piece: Piece, to: usize) -> i32 {
        self.table[piece.index()][to]
    }

    /// Halve every score so recent cutoffs outweigh old ones.
    pub fn age(&mut self) {
        for entry in self.table.iter_mut().flatten() {
            *entry /= 2;
        }
    }

    pub fn clear(&mut self) {
        self.table = [[0; 64]; 12];
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}
