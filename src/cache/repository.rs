//! Repository Module
//!
//! The operation set every eviction engine implements, and the limits they
//! enforce.

use std::time::{Duration, Instant};

use crate::cache::{CacheStats, Document};
use crate::config::Config;
use crate::error::Result;

// == Repository ==
/// Uniform contract of an eviction engine.
///
/// Every operation may mutate ordering state, including `get`, so callers
/// sharing an engine between threads must serialize all calls.
pub trait Repository<V> {
    /// Inserts or overwrites `key`. Evicts other entries when a bound is
    /// breached; never fails because of capacity. An expired entry under
    /// `key` is dropped and replaced by a fresh one.
    fn set(&mut self, key: String, value: V) -> Result<()>;

    /// Returns the value for `key`, refreshing its ordering metadata.
    ///
    /// # Errors
    /// `CacheError::Missed` when the key is absent or expired.
    fn get(&mut self, key: &str) -> Result<&V>;

    /// Removes `key` and returns its value.
    ///
    /// # Errors
    /// `CacheError::Missed` when the key is absent or expired.
    fn delete(&mut self, key: &str) -> Result<V>;

    /// Lists live keys, dropping expired entries encountered on the way.
    fn keys(&mut self) -> Result<Vec<String>>;

    /// Removes every entry.
    fn clear(&mut self) -> Result<()>;

    /// Number of stored entries, including ones not yet found expired.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Approximate memory held by all entries, in bytes.
    fn memory_usage(&self) -> u64;

    /// Snapshot of the engine's statistics.
    fn stats(&self) -> CacheStats;
}

// == Limits ==
/// Capacity and age bounds shared by both engines. Zero disables a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limits {
    /// Maximum live entries
    pub max_items: u64,
    /// Maximum approximate bytes
    pub max_memory: u64,
    /// Maximum age since last touch
    pub expiry_time: Duration,
}

impl Limits {
    pub fn new(max_items: u64, max_memory: u64, expiry_time: Duration) -> Self {
        Self {
            max_items,
            max_memory,
            expiry_time,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_size_item, config.max_memory, config.expiry_time)
    }

    // == Exceeded ==
    /// Checks whether `items` entries weighing `memory` bytes breach a bound.
    pub fn exceeded(&self, items: usize, memory: u64) -> bool {
        (self.max_items > 0 && items as u64 > self.max_items)
            || (self.max_memory > 0 && memory > self.max_memory)
    }

    /// Checks whether a document has outlived the expiry time at `now`.
    pub fn is_expired<V>(&self, document: &Document<V>, now: Instant) -> bool {
        document.is_expired(self.expiry_time, now)
    }
}
