//! Errors raised by individual news sources

use thiserror::Error;

/// Failure of a single source fetch
#[derive(Error, Debug)]
pub enum NewsError {
    /// Transport or decoding failure reported by the HTTP client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-success status
    #[error("{source_name} responded with status {status}")]
    Status { source_name: String, status: u16 },

    /// The HTTP client could not be built from the configuration
    #[error("Client configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with NewsError
pub type NewsResult<T> = Result<T, NewsError>;
