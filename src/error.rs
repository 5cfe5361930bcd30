//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::io;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the two-tier cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key has no record on disk (read or delete). A normal outcome,
    /// not a fault.
    #[error("key not found: {0}")]
    NotFound(String),

    /// Serialization or deserialization of a payload failed.
    #[error("{op} failed for key '{key}'")]
    Encoding {
        /// The key being encoded or decoded
        key: String,
        /// The operation that failed ("serialize" or "deserialize")
        op: &'static str,
        /// Underlying serde_json cause
        #[source]
        source: serde_json::Error,
    },

    /// A directory or file operation failed for a reason other than absence.
    #[error("{op} failed for key '{key}'")]
    Access {
        /// The key the operation was acting on
        key: String,
        /// The filesystem operation that failed
        op: &'static str,
        /// Underlying I/O cause
        #[source]
        source: io::Error,
    },

    /// The remove-then-rename sequence kept failing until the retry
    /// bound was hit.
    #[error("replacing record for key '{key}' still failing after {attempts} attempts")]
    RetryExhausted {
        /// The key whose record could not be replaced
        key: String,
        /// How many rename attempts were made
        attempts: u32,
        /// The error from the final attempt
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    /// Builds an `Access` error annotated with the operation and key.
    pub(crate) fn access(op: &'static str, key: &str, source: io::Error) -> Self {
        CacheError::Access {
            key: key.to_string(),
            op,
            source,
        }
    }

    /// Returns true for the "key absent" outcome, letting callers treat
    /// it as a miss rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
