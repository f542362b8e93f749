//! Configuration Module
//!
//! Construction parameters for a cache instance.

use std::env;

use crate::error::{CacheError, Result};

/// Number of shards used when nothing else is configured.
pub const DEFAULT_SHARD_COUNT: usize = 64;

/// Cache configuration parameters.
///
/// Each cache owns its own configuration, so differently sized caches can
/// live side by side in one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Number of independent shards (fixed for the cache's lifetime)
    pub shard_count: usize,
}

impl CacheConfig {
    /// Creates a config with the given shard count.
    pub fn new(shard_count: usize) -> Self {
        Self { shard_count }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SHARDS` - Number of shards (default: 64)
    pub fn from_env() -> Self {
        Self {
            shard_count: env::var("CACHE_SHARDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SHARD_COUNT),
        }
    }

    /// Checks that the configuration can back a cache.
    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(CacheError::InvalidConfig(
                "shard_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
        }
    }
}
