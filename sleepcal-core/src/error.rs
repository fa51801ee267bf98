//! Error types for sleepcal.

use thiserror::Error;

/// Errors that can occur in sleepcal operations.
#[derive(Error, Debug)]
pub enum SleepcalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for sleepcal operations.
pub type SleepcalResult<T> = Result<T, SleepcalError>;
