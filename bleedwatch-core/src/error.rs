//! Errors raised by cache backends.

use thiserror::Error;

#[derive(Error, Debug)]
/// Failure talking to a [`CacheStore`](crate::cache::CacheStore) backend.
pub enum CacheError {
    /// A command against the backend failed.
    #[error("cache backend error: {0}")]
    Backend(String),

    /// The backend could not be reached.
    #[error("cache connection error: {0}")]
    Connection(String),

    /// A stored entry could not be encoded or decoded.
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
