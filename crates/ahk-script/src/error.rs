use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the script crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors raised while constructing script IR or calling into the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A callback capture variable was empty or whitespace.
    #[error("Pipe variable name cannot be empty or whitespace")]
    InvalidPipeVariable,

    /// A strict-mode function call exceeded the engine's argument limit.
    #[error("Expected at most {max} parameters, got {got}")]
    TooManyArguments {
        /// Number of arguments supplied.
        got: usize,
        /// Maximum the engine accepts.
        max: usize,
    },

    /// Generator configuration could not be parsed.
    #[error("Invalid generator config: {0}")]
    Config(#[from] ron::error::SpannedError),
}
