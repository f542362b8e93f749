//! Cache Store Module
//!
//! Main cache engine: a fixed array of shards addressed by key hash, with
//! per-entry TTL watchers running on tokio.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{info, trace};

use crate::cache::router::shard_index;
use crate::cache::{CacheStats, Shard};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_expiry_watcher;

#[derive(Debug)]
struct CacheInner<V> {
    shards: Box<[Arc<Shard<V>>]>,
    /// Runtime captured at construction, used when the caller has none
    runtime: Option<Handle>,
}

// == Cache ==
/// Thread-safe, sharded key/value cache with optional per-entry TTL.
///
/// Cloning is cheap and every clone shares the same shards.
///
/// TTL watchers run as tokio tasks. There is no bulk shutdown: a watcher
/// lives until its entry expires, is overwritten or removed, or its runtime
/// shuts down.
#[derive(Debug)]
pub struct Cache<V> {
    inner: Arc<CacheInner<V>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache with the default shard count.
    ///
    /// Captures the current tokio runtime, if any; TTL watchers run there.
    pub fn new() -> Self {
        Self::from_parts(
            CacheConfig::default().shard_count,
            Handle::try_current().ok(),
        )
    }

    /// Creates a cache from an explicit configuration.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(
            config.shard_count,
            Handle::try_current().ok(),
        ))
    }

    /// Returns a builder for a customised cache.
    pub fn builder() -> CacheBuilder<V> {
        CacheBuilder::new()
    }

    fn from_parts(shard_count: usize, runtime: Option<Handle>) -> Self {
        let shards = (0..shard_count).map(|_| Arc::new(Shard::new())).collect();
        info!(shard_count, has_runtime = runtime.is_some(), "Cache initialized");
        Self {
            inner: Arc::new(CacheInner { shards, runtime }),
        }
    }

    fn shard(&self, key: &str) -> &Arc<Shard<V>> {
        &self.inner.shards[shard_index(key, self.inner.shards.len())]
    }

    // == Set ==
    /// Stores `value` under `key` with no expiration.
    ///
    /// Overwriting a TTL entry cancels its pending expiry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        trace!(key = %key, "set");
        self.shard(&key).insert(key, value);
    }

    // == Set With TTL ==
    /// Stores `value` under `key` and removes it after `ttl_secs` seconds.
    ///
    /// # Errors
    /// - `InvalidTtl` if `ttl_secs` is zero; the cache is left untouched
    /// - `NoRuntime` if no tokio runtime is reachable to run the watcher
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl_secs: u64) -> Result<()> {
        if ttl_secs == 0 {
            return Err(CacheError::InvalidTtl(
                "ttl must be at least 1 second".to_string(),
            ));
        }
        self.set_with_ttl_duration(key, value, Duration::from_secs(ttl_secs))
    }

    /// Like [`set_with_ttl`](Self::set_with_ttl) with sub-second precision.
    pub fn set_with_ttl_duration(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Duration,
    ) -> Result<()> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl("ttl must be positive".to_string()));
        }
        let runtime = self.runtime()?;

        let key = key.into();
        trace!(key = %key, ?ttl, "set with ttl");

        let shard = self.shard(&key);
        let (generation, cancelled) = shard.insert_watched(key.clone(), value);
        spawn_expiry_watcher(
            &runtime,
            Arc::downgrade(shard),
            key,
            generation,
            ttl,
            cancelled,
        );
        Ok(())
    }

    /// Prefers the runtime configured or captured at construction, which
    /// outlives any short-lived runtime the caller happens to be inside.
    fn runtime(&self) -> Result<Handle> {
        self.inner
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or(CacheError::NoRuntime)
    }

    // == Get ==
    /// Retrieves a clone of the value stored under `key`.
    ///
    /// Counts a hit when found and a miss otherwise.
    pub fn get(&self, key: &str) -> Option<V> {
        self.shard(key).get(key)
    }

    // == Remove ==
    /// Deletes `key` and returns its value. Absent keys are a silent no-op.
    pub fn remove(&self, key: &str) -> Option<V> {
        trace!(key = %key, "remove");
        self.shard(key).remove(key)
    }

    /// Returns true if `key` is present, without touching hit/miss counters.
    pub fn contains_key(&self, key: &str) -> bool {
        self.shard(key).contains_key(key)
    }

    // == Stats ==
    /// Returns a snapshot of the counters summed over all shards.
    ///
    /// Shards are visited one at a time; no two shard locks are ever held
    /// together.
    pub fn stats(&self) -> CacheStats {
        let shards = &self.inner.shards;
        let mut stats = CacheStats::new(shards[0].stats().created_at());
        for shard in shards.iter() {
            shard.accumulate_stats(&mut stats);
        }
        stats
    }

    // == Length ==
    /// Returns the number of live entries across all shards.
    pub fn len(&self) -> usize {
        self.inner.shards.iter().map(|shard| shard.len()).sum()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.shards.iter().all(|shard| shard.is_empty())
    }

    pub fn shard_count(&self) -> usize {
        self.inner.shards.len()
    }
}

impl<V> Default for Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

// == Cache Builder ==
/// Builder for caches that need a non-default shard count or an explicit
/// runtime for TTL watchers.
///
/// # Example
/// ```
/// use sharded_cache::Cache;
///
/// let cache: Cache<String> = Cache::builder().shard_count(16).build().unwrap();
/// assert_eq!(cache.shard_count(), 16);
/// ```
#[derive(Debug)]
pub struct CacheBuilder<V> {
    config: CacheConfig,
    runtime: Option<Handle>,
    _value: PhantomData<fn() -> V>,
}

impl<V> CacheBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            runtime: None,
            _value: PhantomData,
        }
    }

    /// Sets the number of shards.
    pub fn shard_count(mut self, shard_count: usize) -> Self {
        self.config.shard_count = shard_count;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Runtime every TTL watcher is spawned on, whatever runtime the caller
    /// is running inside.
    ///
    /// Defaults to the runtime current at `build` time. Without either, the
    /// caller's runtime at `set_with_ttl` time is used.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<Cache<V>> {
        self.config.validate()?;
        let runtime = self.runtime.or_else(|| Handle::try_current().ok());
        Ok(Cache::from_parts(self.config.shard_count, runtime))
    }
}

impl<V> Default for CacheBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
