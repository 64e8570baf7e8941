//! Per-search state threaded through every recursive call.

use std::time::Duration;

use alfil_core::Move;

use crate::config::SearchConfig;
use crate::search::control::{CancelToken, SearchControl};
use crate::search::heuristics::{HistoryTable, KillerTable};
use crate::search::tt::TranspositionTable;

/// Everything one search invocation reads and writes.
///
/// The tables are borrowed from the [`Searcher`](crate::Searcher) that
/// opened the session, so only one search can use them at a time. The
/// cancellation token is the one piece another thread may touch.
pub struct SearchSession<'a> {
    pub(crate) tt: &'a mut TranspositionTable,
    pub(crate) killers: &'a mut KillerTable,
    pub(crate) history: &'a mut HistoryTable,
    pub(crate) config: &'a SearchConfig,
    cancel: CancelToken,
    control: SearchControl,
    nodes: u64,
    stopped: bool,
    best: Option<Move>,
    max_depth: i32,
}

impl<'a> SearchSession<'a> {
    pub(crate) fn new(
        tt: &'a mut TranspositionTable,
        killers: &'a mut KillerTable,
        history: &'a mut HistoryTable,
        config: &'a SearchConfig,
        cancel: CancelToken,
    ) -> Self {
        let control = SearchControl::new(
            cancel.clone(),
            Duration::MAX,
            config.time_usage_percent,
            config.next_depth_percent,
        );
        Self {
            tt,
            killers,
            history,
            config,
            cancel,
            control,
            nodes: 0,
            stopped: false,
            best: None,
            max_depth: config.max_depth,
        }
    }

    /// Restart the clock with a fresh budget and zero the counters.
    pub(crate) fn begin(&mut self, budget: Duration) {
        self.control = SearchControl::new(
            self.cancel.clone(),
            budget,
            self.config.time_usage_percent,
            self.config.next_depth_percent,
        );
        self.nodes = 0;
        self.stopped = false;
        self.best = None;
    }

    /// Cap the deepest iteration, never beyond the configured maximum.
    pub fn limit_depth(&mut self, depth: i32) {
        self.max_depth = depth.min(self.config.max_depth).max(1);
    }

    pub fn max_depth(&self) -> i32 {
        self.max_depth
    }

    /// Count a node and, every `check_interval` nodes, poll the clock and
    /// the cancellation flag. Returns whether the search must unwind.
    pub(crate) fn checkpoint(&mut self) -> bool {
        self.nodes += 1;
        if !self.stopped
            && self.nodes % self.config.check_interval.max(1) == 0
            && self.control.should_stop()
        {
            self.stopped = true;
        }
        self.stopped
    }

    /// Whether the search has been told to unwind.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn elapsed(&self) -> Duration {
        self.control.elapsed()
    }

    pub fn control(&self) -> &SearchControl {
        &self.control
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Best move of the last fully completed depth.
    pub fn best_move(&self) -> Option<Move> {
        self.best
    }

    pub(crate) fn record_completed(&mut self, mv: Move) {
        self.best = Some(mv);
    }
}
