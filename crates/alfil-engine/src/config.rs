//! Search tunables.

use crate::error::ConfigError;
use crate::search::MAX_PLY;

/// Largest transposition table accepted, in megabytes.
pub const MAX_HASH_MB: usize = 4096;

/// Accept a transposition table size in megabytes if it is in range.
pub fn check_hash_mb(mb: usize) -> Result<usize, ConfigError> {
    if (1..=MAX_HASH_MB).contains(&mb) {
        Ok(mb)
    } else {
        Err(ConfigError::HashSize {
            mb,
            max: MAX_HASH_MB,
        })
    }
}

/// Knobs that shape the search without changing its contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Transposition table slots; rounded down to a power of two.
    pub tt_entries: usize,
    /// Deepest iteration the driver will start.
    pub max_depth: i32,
    /// Share of the time budget after which the search aborts mid-iteration.
    pub time_usage_percent: u32,
    /// A new iteration is skipped when the time left is below this share
    /// of what the previous iteration took.
    pub next_depth_percent: u32,
    /// Nodes between cancellation and clock checks.
    pub check_interval: u64,
    pub null_move: bool,
    pub null_move_reduction: i32,
    /// Shallowest remaining depth at which null-move pruning is tried.
    pub null_move_min_depth: i32,
    pub delta_pruning: bool,
    /// Safety margin in centipawns for quiescence delta pruning.
    pub delta_margin: i32,
    /// Keep killer moves from one search to the next.
    pub persist_killers: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tt_entries: 1 << 20,
            max_depth: 64,
            time_usage_percent: 90,
            next_depth_percent: 50,
            check_interval: 2048,
            null_move: true,
            null_move_reduction: 3,
            null_move_min_depth: 3,
            delta_pruning: true,
            delta_margin: 200,
            persist_killers: false,
        }
    }
}

impl SearchConfig {
    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = MAX_PLY as i32 - 1;
        if !(1..=max).contains(&self.max_depth) {
            return Err(ConfigError::Depth {
                depth: self.max_depth,
                max,
            });
        }
        if !(1..=100).contains(&self.time_usage_percent) {
            return Err(ConfigError::TimeUsage {
                percent: self.time_usage_percent,
            });
        }
        Ok(())
    }

    /// Same configuration with pruning that can change the minimax value switched off.
    ///
    /// Useful for comparing the search against an exhaustive reference.
    pub fn exact(self) -> Self {
        Self {
            null_move: false,
            delta_pruning: false,
            ..self
        }
    }
}
