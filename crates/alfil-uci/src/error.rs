//! UCI protocol errors.

use alfil_core::{FenError, MoveParseError};
use alfil_engine::ConfigError;

/// Errors that can occur during UCI protocol handling.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command is missing `startpos` or `fen` keyword.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    /// Failed to parse a FEN string.
    #[error("invalid FEN \"{fen}\": {source}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
        source: FenError,
    },

    /// A move in the `position` command is malformed or illegal.
    #[error("invalid move: {source}")]
    InvalidMove {
        #[from]
        source: MoveParseError,
    },

    /// A `go` parameter was given without its value.
    #[error("missing value for go parameter {param}")]
    MissingGoValue { param: String },

    /// A `go` parameter value is not a number in range.
    #[error("invalid value for go parameter {param}: {value}")]
    InvalidGoValue { param: String, value: String },

    /// `setoption` carried a value the option does not accept.
    #[error("invalid value for option {name}: {value}")]
    InvalidOption { name: String, value: String },

    /// The option value parsed but lies outside what the engine supports.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An I/O error occurred while reading from stdin.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
