//! Search control: stop flag and time management.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared stop flag, set by whoever wants the search to end early.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Controls when a search should stop.
///
/// The hard limit is a share of the budget that no iteration may run past;
/// the search notices it at its node checkpoints. Between iterations the
/// driver additionally asks whether the next depth is likely to fit.
#[derive(Debug, Clone)]
pub struct SearchControl {
    cancel: CancelToken,
    start: Instant,
    budget: Duration,
    hard_limit: Duration,
    next_depth_percent: u32,
}

impl SearchControl {
    /// Start the clock now.
    pub fn new(
        cancel: CancelToken,
        budget: Duration,
        time_usage_percent: u32,
        next_depth_percent: u32,
    ) -> Self {
        Self {
            cancel,
            start: Instant::now(),
            budget,
            hard_limit: (budget / 100).saturating_mul(time_usage_percent),
            next_depth_percent,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn hard_limit(&self) -> Duration {
        self.hard_limit
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn hard_limit_reached(&self) -> bool {
        self.elapsed() >= self.hard_limit
    }

    /// Check whether the search should abort immediately.
    pub fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.hard_limit_reached()
    }

    /// Check whether iterative deepening should start another depth.
    ///
    /// `last_iteration` is how long the previous depth took; when the time
    /// left before the hard limit is below the configured share of it, the
    /// next depth is unlikely to finish and is not started.
    pub fn should_stop_iterating(&self, last_iteration: Option<Duration>) -> bool {
        if self.should_stop() {
            return true;
        }
        let Some(last) = last_iteration else {
            return false;
        };
        let remaining = self.hard_limit.saturating_sub(self.elapsed());
        remaining < (last / 100).saturating_mul(self.next_depth_percent)
    }
}
