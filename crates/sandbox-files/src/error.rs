//! Error types for sandbox-files.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for sandbox-files operations.
pub type Result<T> = std::result::Result<T, FileError>;

/// Errors that can occur while reading a remote file.
#[derive(Debug, Error)]
pub enum FileError {
    /// The agent reported that the path does not exist.
    #[error("no such file or directory: {path}")]
    DoesNotExist {
        /// Resolved path on the agent
        path: String,
    },

    /// Transport failure from the host, passed through untouched
    #[error(transparent)]
    Host(#[from] HostError),

    /// Paging response could not be decoded
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Rejected configuration
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl FileError {
    /// Check whether this is the "file does not exist" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DoesNotExist { .. })
    }
}

/// Errors raised by a [`Host`](crate::Host) while talking to an agent.
#[derive(Debug, Error)]
pub enum HostError {
    /// The request URI could not be built
    #[error("invalid uri: {0}")]
    InvalidUri(String),

    /// The request failed at the HTTP layer
    #[error("request failed: {0}")]
    Request(#[from] hyper::Error),

    /// The agent did not answer in time
    #[error("request timeout after {0:?}")]
    Timeout(Duration),

    /// The agent answered with an unexpected status
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, lossily decoded
        body: String,
    },

    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}
