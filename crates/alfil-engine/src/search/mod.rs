//! Search algorithms and move ordering.

pub mod control;
pub mod driver;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod quiescence;
pub mod session;
pub mod tt;

use std::time::Duration;

use tracing::debug;

use crate::config::{SearchConfig, check_hash_mb};
use crate::error::ConfigError;
use crate::position::{Evaluator, Position};

use control::CancelToken;
use driver::{IterationInfo, SearchResult, find_best_move};
use heuristics::{HistoryTable, KillerTable};
use session::SearchSession;
use tt::TranspositionTable;

/// Score representing an unreachable upper/lower bound.
pub const INF: i32 = 32_000;

/// Score of being mated at the root; mated at ply `n` scores `-(MATE_SCORE - n)`.
pub const MATE_SCORE: i32 = 31_000;

/// Maximum search depth (in plies) for array sizing and recursion limits.
pub const MAX_PLY: usize = 128;

/// Scores at or beyond this magnitude indicate a forced mate.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_PLY as i32;

/// Full moves until mate for a mate score, negative when the side to move is mated.
///
/// Returns `None` for ordinary centipawn scores.
pub fn mate_in(score: i32) -> Option<i32> {
    if score.abs() < MATE_THRESHOLD {
        return None;
    }
    let moves = (MATE_SCORE - score.abs() + 1) / 2;
    Some(if score > 0 { moves } else { -moves })
}

/// Game-scoped owner of the tables that outlive a single search.
///
/// The transposition table and history survive from one move to the next
/// and are only wiped by [`new_game`](Self::new_game).
pub struct Searcher {
    config: SearchConfig,
    tt: TranspositionTable,
    killers: KillerTable,
    history: HistoryTable,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            tt: TranspositionTable::new(config.tt_entries),
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            config,
        }
    }

    /// Searcher whose transposition table fills `mb` megabytes.
    ///
    /// Rejects a hash size or configuration the search cannot honour.
    pub fn with_hash_mb(config: SearchConfig, mb: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        let tt = TranspositionTable::with_megabytes(check_hash_mb(mb)?);
        Ok(Self {
            config: SearchConfig {
                tt_entries: tt.capacity(),
                ..config
            },
            tt,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Read access to the transposition table, e.g. to inspect stored bounds.
    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Forget everything learned in the previous game.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.history.clear();
    }

    /// Replace the transposition table with an empty one of `mb` megabytes.
    pub fn resize_tt(&mut self, mb: usize) {
        self.tt = TranspositionTable::with_megabytes(mb);
        self.config.tt_entries = self.tt.capacity();
        debug!(mb, entries = self.tt.capacity(), "transposition table resized");
    }

    /// Open a session over this searcher's tables for one search.
    ///
    /// Killers are reset unless configured to persist, and history scores
    /// are halved so that older games weigh less than recent cutoffs.
    pub fn session(&mut self, cancel: CancelToken) -> SearchSession<'_> {
        if !self.config.persist_killers {
            self.killers.clear();
        }
        self.history.age();
        SearchSession::new(
            &mut self.tt,
            &mut self.killers,
            &mut self.history,
            &self.config,
            cancel,
        )
    }

    /// Run one iterative-deepening search within `budget`.
    ///
    /// `depth_limit` caps the deepest iteration below the configured maximum.
    pub fn search<P, E, F>(
        &mut self,
        pos: &mut P,
        eval: &E,
        budget: Duration,
        cancel: CancelToken,
        depth_limit: Option<i32>,
        on_iter: F,
    ) -> SearchResult
    where
        P: Position + ?Sized,
        E: Evaluator<P> + ?Sized,
        F: FnMut(&IterationInfo<'_>),
    {
        let mut session = self.session(cancel);
        if let Some(depth) = depth_limit {
            session.limit_depth(depth);
        }
        find_best_move(pos, eval, budget, &mut session, on_iter)
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("config", &self.config)
            .field("tt", &self.tt)
            .finish()
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}
