//! GitHub API error type

use thiserror::Error;

/// Errors from the GitHub API layer
#[derive(Debug, Error)]
pub enum GithubError {
    /// Transport-level failure (connection, TLS, timeout, decode)
    #[error("github request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The token was rejected or lacks access
    #[error("{0}")]
    Auth(String),

    /// The API throttled us
    #[error("too many requests, retry after {retry_after} seconds")]
    RateLimited {
        /// Seconds to wait, from the Retry-After header
        retry_after: u64,
    },

    /// The requested object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// An object exists but is not usable for the requested operation
    #[error("{0}")]
    Lookup(String),

    /// Any other non-success response
    #[error("github api error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },
}
