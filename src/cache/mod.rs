//! Cache Module
//!
//! Provides the sharded in-memory cache with per-entry TTL expiration.
//!
//! Shards, entries and their watcher handles stay internal; only the cache,
//! its builder, the stats snapshot and the key router are exported.
//!
//! ```compile_fail
//! use sharded_cache::cache::Shard;
//! ```
//!
//! ```compile_fail
//! use sharded_cache::cache::ShardStats;
//! ```

mod entry;
mod router;
mod shard;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use router::{fnv32, shard_index};
pub(crate) use shard::Shard;
pub use stats::CacheStats;
pub use store::{Cache, CacheBuilder};
