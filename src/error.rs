//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// `Missed` is the only error a running cache produces. The remaining
/// variants are raised while resolving configuration, before any engine
/// exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is absent, was deleted, or has expired
    #[error("Cache item's missing")]
    Missed,

    /// Algorithm name is neither "lru" nor "lfu"
    #[error("Unknown algorithm type: {0}")]
    UnknownAlgorithm(String),

    /// Option value could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
