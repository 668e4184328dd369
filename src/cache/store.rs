//! Cache Facade Module
//!
//! Thread-safe cache handle serializing every call into the configured engine.

use std::fmt;

use parking_lot::Mutex;
use tracing::info;

use crate::cache::size::SizeEstimate;
use crate::cache::{CacheStats, LfuRepository, Limits, LruRepository, Repository};
use crate::config::{Algorithm, CacheOptions, Config};
use crate::error::Result;

/// Engine behind a cache handle.
pub type BoxedRepository<V> = Box<dyn Repository<V> + Send>;

// == New Repository ==
/// Builds the engine selected by `config`.
pub fn new_repository<V>(config: &Config) -> BoxedRepository<V>
where
    V: SizeEstimate + Send + 'static,
{
    let limits = Limits::from_config(config);
    match config.algorithm {
        Algorithm::Lru => Box::new(LruRepository::new(limits)),
        Algorithm::Lfu => Box::new(LfuRepository::new(limits)),
    }
}

// == Cache ==
/// In-process key-value cache bounded by item count, approximate memory and
/// entry age.
///
/// All operations, reads included, take the same lock: a successful `get`
/// reorders the engine's recency or frequency structures. Share a cache
/// between threads by wrapping it in an `Arc`.
///
/// ```
/// use mini_cache::{Cache, CacheError, CacheOptions};
///
/// let cache: Cache<String> = Cache::from_options(CacheOptions {
///     algorithm_type: Some("lfu".to_string()),
///     max_size_item: Some(100),
///     ..Default::default()
/// })
/// .unwrap();
///
/// cache.set("name", "John Snow".to_string()).unwrap();
/// assert_eq!(cache.get("name").unwrap(), "John Snow");
///
/// cache.delete("name").unwrap();
/// assert_eq!(cache.get("name"), Err(CacheError::Missed));
/// ```
pub struct Cache<V> {
    repo: Mutex<BoxedRepository<V>>,
    config: Config,
}

impl<V> Cache<V>
where
    V: SizeEstimate + Clone + Send + 'static,
{
    // == Constructors ==
    /// Creates a cache with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a cache from a resolved configuration.
    pub fn with_config(config: Config) -> Self {
        info!(
            "Cache initialized: algorithm={}, expiry_time={:?}, max_size_item={}, max_memory={}",
            config.algorithm, config.expiry_time, config.max_size_item, config.max_memory
        );
        Self {
            repo: Mutex::new(new_repository(&config)),
            config,
        }
    }

    /// Resolves raw options and creates a cache.
    ///
    /// # Errors
    /// `CacheError::UnknownAlgorithm` when the algorithm name is not
    /// recognized.
    pub fn from_options(options: CacheOptions) -> Result<Self> {
        Ok(Self::with_config(Config::resolve(options)?))
    }

    // == Set ==
    /// Stores a value, overwriting any previous value for the key.
    pub fn set(&self, key: impl Into<String>, value: V) -> Result<()> {
        self.repo.lock().set(key.into(), value)
    }

    // == Get ==
    /// Returns a copy of the value stored under `key`.
    ///
    /// # Errors
    /// `CacheError::Missed` when the key is absent, deleted or expired.
    pub fn get(&self, key: &str) -> Result<V> {
        self.repo.lock().get(key).cloned()
    }

    // == Delete ==
    /// Removes `key`.
    ///
    /// # Errors
    /// `CacheError::Missed` when the key is absent or expired.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.repo.lock().delete(key)?;
        Ok(())
    }

    // == Get Keys ==
    /// Lists every live key. Expired entries found along the way are dropped.
    pub fn get_keys(&self) -> Result<Vec<String>> {
        self.repo.lock().keys()
    }

    // == Clear Cache ==
    /// Removes every entry.
    pub fn clear_cache(&self) -> Result<()> {
        self.repo.lock().clear()
    }

    /// Number of stored entries, including ones not yet found expired.
    pub fn len(&self) -> usize {
        self.repo.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.repo.lock().is_empty()
    }

    /// Approximate memory held by all entries, in bytes.
    pub fn memory_usage(&self) -> u64 {
        self.repo.lock().memory_usage()
    }

    pub fn stats(&self) -> CacheStats {
        self.repo.lock().stats()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }
}

impl<V> Default for Cache<V>
where
    V: SizeEstimate + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.config)
            .field("len", &self.repo.lock().len())
            .finish()
    }
}
