//! Configuration Module
//!
//! Resolves cache options into a validated configuration. Options can come
//! from code, a JSON document, or environment variables; all three go through
//! the same merge step so defaults and validation live in one place.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::MB;
use crate::error::{CacheError, Result};

// == Defaults ==
/// Default eviction algorithm name
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::Lru;

/// Default time-to-live of each stored item
pub const DEFAULT_EXPIRY_TIME: Duration = Duration::from_secs(10);

/// Default maximum number of live items
pub const DEFAULT_MAX_SIZE_ITEM: u64 = 100;

/// Default maximum approximate memory in bytes
pub const DEFAULT_MAX_MEMORY: u64 = 10 * MB;

// == Algorithm ==
/// Eviction algorithm used by the cache engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Least recently used
    #[default]
    Lru,
    /// Least frequently used, ties broken by recency
    Lfu,
}

impl Algorithm {
    /// Returns the canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Lru => "lru",
            Algorithm::Lfu => "lfu",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lru" => Ok(Algorithm::Lru),
            "lfu" => Ok(Algorithm::Lfu),
            other => Err(CacheError::UnknownAlgorithm(other.to_string())),
        }
    }
}

// == Cache Options ==
/// Raw, unvalidated cache options.
///
/// Every field is optional; anything left as `None` takes its default when
/// the options are resolved with [`Config::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheOptions {
    /// Algorithm name, `"lru"` or `"lfu"`
    pub algorithm_type: Option<String>,
    /// Time-to-live in milliseconds, 0 = never expire
    pub expiry_time_ms: Option<u64>,
    /// Maximum live item count, 0 = unbounded
    pub max_size_item: Option<u64>,
    /// Maximum approximate bytes, 0 = unbounded
    pub max_memory: Option<u64>,
}

// == Config ==
/// Resolved cache configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Eviction algorithm
    pub algorithm: Algorithm,
    /// Time-to-live of each entry, `Duration::ZERO` = never expire
    pub expiry_time: Duration,
    /// Maximum number of live entries, 0 = unbounded
    pub max_size_item: u64,
    /// Maximum approximate memory in bytes, 0 = unbounded
    pub max_memory: u64,
}

impl Config {
    // == Resolve ==
    /// Merges options over the defaults, validating the algorithm name.
    ///
    /// # Errors
    /// Returns `CacheError::UnknownAlgorithm` when `algorithm_type` is set to
    /// anything other than `"lru"` or `"lfu"`.
    pub fn resolve(options: CacheOptions) -> Result<Self> {
        let defaults = Self::default();

        let algorithm = match options.algorithm_type {
            Some(name) => name.parse()?,
            None => defaults.algorithm,
        };

        Ok(Self {
            algorithm,
            expiry_time: options
                .expiry_time_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.expiry_time),
            max_size_item: options.max_size_item.unwrap_or(defaults.max_size_item),
            max_memory: options.max_memory.unwrap_or(defaults.max_memory),
        })
    }

    // == From JSON ==
    /// Parses a JSON options document and resolves it.
    ///
    /// ```
    /// use mini_cache::{Algorithm, Config};
    ///
    /// let config = Config::from_json(r#"{"algorithm_type": "lfu", "max_size_item": 2}"#).unwrap();
    /// assert_eq!(config.algorithm, Algorithm::Lfu);
    /// assert_eq!(config.max_size_item, 2);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let options: CacheOptions =
            serde_json::from_str(json).map_err(|e| CacheError::InvalidConfig(e.to_string()))?;
        Self::resolve(options)
    }

    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ALGORITHM` - `lru` or `lfu` (default: lru)
    /// - `CACHE_EXPIRY_MS` - TTL in milliseconds (default: 10000)
    /// - `CACHE_MAX_SIZE_ITEM` - Maximum item count (default: 100)
    /// - `CACHE_MAX_MEMORY` - Maximum approximate bytes (default: 10 MiB)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |name: &str| -> Result<Option<u64>> {
            lookup(name)
                .map(|raw| {
                    raw.trim()
                        .parse()
                        .map_err(|_| CacheError::InvalidConfig(format!("{}: {}", name, raw)))
                })
                .transpose()
        };

        Self::resolve(CacheOptions {
            algorithm_type: lookup("CACHE_ALGORITHM"),
            expiry_time_ms: number("CACHE_EXPIRY_MS")?,
            max_size_item: number("CACHE_MAX_SIZE_ITEM")?,
            max_memory: number("CACHE_MAX_MEMORY")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM,
            expiry_time: DEFAULT_EXPIRY_TIME,
            max_size_item: DEFAULT_MAX_SIZE_ITEM,
            max_memory: DEFAULT_MAX_MEMORY,
        }
    }
}
