//! Mini Cache - A lightweight in-process key-value cache
//!
//! Bounds stored entries by item count, approximate memory and age, evicting
//! with either a Least Recently Used or a Least Frequently Used policy.
//! Expired entries are discovered lazily when accessed or enumerated; there
//! is no background sweeper.
//!
//! ```
//! use std::time::Duration;
//! use mini_cache::{Algorithm, Cache, Config};
//!
//! let cache: Cache<String> = Cache::with_config(Config {
//!     algorithm: Algorithm::Lfu,
//!     expiry_time: Duration::from_secs(600),
//!     ..Config::default()
//! });
//!
//! cache.set("Kue", "Nama".to_string()).unwrap();
//! assert_eq!(cache.get("Kue").unwrap(), "Nama");
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, CacheStats, SizeEstimate, KB, MB};
pub use config::{Algorithm, CacheOptions, Config};
pub use error::{CacheError, Result};
