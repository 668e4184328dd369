//! Cache Module
//!
//! In-process caching with lazy TTL expiration and LRU or LFU eviction.

mod arena;
mod document;
mod lfu;
mod lru;
mod repository;
mod size;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use document::Document;
pub use lfu::LfuRepository;
pub use lru::LruRepository;
pub use repository::{Limits, Repository};
pub use size::{entry_size, SizeEstimate};
pub use stats::CacheStats;
pub use store::{new_repository, BoxedRepository, Cache};

// == Public Constants ==
/// One byte of estimated memory
pub const BYTE: u64 = 1;

/// One kibibyte
pub const KB: u64 = 1024 * BYTE;

/// One mebibyte
pub const MB: u64 = 1024 * KB;
