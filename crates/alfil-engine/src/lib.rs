//! Search and evaluation for alfil.

pub mod config;
pub mod error;
pub mod eval;
pub mod position;
pub mod search;
pub mod time;

pub use config::SearchConfig;
pub use error::ConfigError;
pub use eval::{PestoEvaluator, evaluate};
pub use position::{Evaluator, Position};
pub use search::control::{CancelToken, SearchControl};
pub use search::driver::{IterationInfo, SearchResult, find_best_move};
pub use search::session::SearchSession;
pub use search::{INF, MATE_SCORE, MATE_THRESHOLD, MAX_PLY, Searcher, mate_in};
pub use time::{ClockParams, budget_from_go};
