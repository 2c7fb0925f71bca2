//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A caller passed a value the operation cannot accept, such as a
    /// non-positive capacity. Raised before any state changes.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Size accounting no longer adds up. This is a bug in the embedder's
    /// size function and is never recovered from internally.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
