//! Sharded Cache - A thread-safe in-process key/value cache
//!
//! Keys are striped over a fixed number of independently locked shards.
//! Entries may carry a time-to-live enforced by a background tokio task, and
//! hit/miss/set/removal counters are aggregated on demand.
//!
//! # Example
//! ```
//! use sharded_cache::Cache;
//!
//! let cache = Cache::new();
//! cache.set("greeting", "hello".to_string());
//!
//! assert_eq!(cache.get("greeting"), Some("hello".to_string()));
//! assert_eq!(cache.stats().hits, 1);
//! ```

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{Cache, CacheBuilder, CacheStats};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
