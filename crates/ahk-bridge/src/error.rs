use std::{io::Error as IoError, result::Result as StdResult};

use thiserror::Error;

/// Errors surfaced by bridge setup. Transport failures during steady-state
/// operation are recovered internally and never appear here.
#[derive(Error, Debug)]
pub enum Error {
    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// The bridge was created outside a Tokio runtime.
    #[error("Bridge requires a Tokio runtime")]
    NoRuntime,

    /// The engine rejected the client stub.
    #[error("Unable to initialize pipe client:\n{code}")]
    ClientInit {
        /// The rejected code.
        code: String,
    },

    /// Bridge configuration could not be parsed.
    #[error("Invalid bridge config: {0}")]
    Config(#[from] ron::error::SpannedError),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = StdResult<T, Error>;
