//! Engine configuration errors.

/// Rejected engine settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Transposition table size outside the supported range.
    #[error("hash size {mb} MB is outside 1..={max} MB")]
    HashSize { mb: usize, max: usize },

    /// A search depth limit of zero or beyond the ply horizon.
    #[error("depth {depth} is outside 1..={max}")]
    Depth { depth: i32, max: i32 },

    #[error("time usage {percent}% is outside 1..=100")]
    TimeUsage { percent: u32 },
}
