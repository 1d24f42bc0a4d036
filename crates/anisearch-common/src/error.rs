//! Common error types used throughout the AniSearch provider.
//!
//! Only a few of these ever reach a host: orchestration code degrades
//! fetch, parse, and persist failures into absent fields or skipped
//! candidates and logs them instead.

use std::path::PathBuf;

/// Common error type for the AniSearch provider.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A request to the remote catalog failed (status, timeout, or network).
    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed {
        /// The URL that was requested.
        url: String,
        /// Human readable failure reason.
        reason: String,
    },

    /// A single value could not be parsed.
    #[error("Parse failed: {0}")]
    ParseFailed(String),

    /// Writing a cache artifact failed.
    #[error("Failed to persist {}: {source}", path.display())]
    PersistFailed {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a new FetchFailed error.
    pub fn fetch_failed<U: Into<String>, R: ToString>(url: U, reason: R) -> Self {
        Self::FetchFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new ParseFailed error.
    pub fn parse_failed<S: Into<String>>(msg: S) -> Self {
        Self::ParseFailed(msg.into())
    }

    /// Create a new InvalidConfig error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Returns `true` if this error represents caller cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
