//! Error taxonomy
//!
//! The algorithmic layer (fade, status, scheduler) never fails on stored
//! values; it clamps. Errors only come from malformed caller input or from
//! the persistence layer.

use crate::storage::StorageError;

/// Public error type for practice operations
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller supplied a value outside its domain (unknown rating, fade level > 5)
    #[error("Validation error: {0}")]
    Validation(String),
    /// No progress row (or chunk) for the requested key
    #[error("Not found: {0}")]
    NotFound(String),
    /// A concurrent write won the race for the same row
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The store is unavailable or failed mid-operation
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl Error {
    /// Short machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::Persistence(_) => "persistence",
        }
    }

    /// Whether retrying the same request can succeed without changing it
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_) | Error::Persistence(_))
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Error::NotFound(what),
            StorageError::Conflict(what) => Error::Conflict(what),
            StorageError::InvalidChunk(what) => Error::Validation(what),
            other => Error::Persistence(other.to_string()),
        }
    }
}

/// Result alias for practice operations
pub type Result<T> = std::result::Result<T, Error>;
