//! Cache Statistics Module
//!
//! Per-shard counters and the aggregated snapshot handed to callers.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Shard Stats ==
/// Live counters owned by a single shard.
///
/// Counters are atomic so lookups can record hits and misses while holding
/// only the shard's shared lock. Every increment still happens inside the
/// critical section of the operation it counts.
#[derive(Debug)]
pub struct ShardStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    removed: AtomicU64,
    expired: AtomicU64,
    created_at: DateTime<Utc>,
}

impl ShardStats {
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            removed: AtomicU64::new(0),
            expired: AtomicU64::new(0),
            created_at: Utc::now(),
        }
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_removal(&self) {
        self.removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a TTL expiry. Expiries are removals too.
    pub fn record_expiry(&self) {
        self.expired.fetch_add(1, Ordering::Relaxed);
        self.removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // == Accumulate ==
    /// Adds this shard's counters into `total`.
    pub fn accumulate_into(&self, total: &mut CacheStats) {
        total.hits += self.hits.load(Ordering::Relaxed);
        total.misses += self.misses.load(Ordering::Relaxed);
        total.sets += self.sets.load(Ordering::Relaxed);
        total.removed += self.removed.load(Ordering::Relaxed);
        total.expired += self.expired.load(Ordering::Relaxed);
    }
}

impl Default for ShardStats {
    fn default() -> Self {
        Self::new()
    }
}

// == Cache Stats ==
/// Point-in-time aggregate of all shard counters.
///
/// A detached copy: later cache activity never changes a snapshot already
/// handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups for absent keys
    pub misses: u64,
    /// Number of stores, overwrites included
    #[serde(rename = "set")]
    pub sets: u64,
    /// Number of entries removed, explicitly or by TTL expiry
    pub removed: u64,
    /// Number of entries removed by TTL expiry
    pub expired: u64,
    /// Creation time of the first shard
    pub uptime: DateTime<Utc>,
}

impl CacheStats {
    /// Creates an empty snapshot anchored at `uptime`.
    pub fn new(uptime: DateTime<Utc>) -> Self {
        Self {
            hits: 0,
            misses: 0,
            sets: 0,
            removed: 0,
            expired: 0,
            uptime,
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Time elapsed since the cache was created.
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.uptime)
    }
}
