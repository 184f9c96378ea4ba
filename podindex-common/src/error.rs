//! Common error types for the podcast index

use thiserror::Error;

/// Common result type for podcast index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the podcast index crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote service could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// Remote service answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Remote payload could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the failure came from a remote service rather than from us
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Api { .. } | Error::Parse(_))
    }
}
