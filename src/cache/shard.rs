//! Cache Shard Module
//!
//! One independent partition of the key space: its own map, counters and
//! reader/writer lock.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::oneshot;

use crate::cache::entry::{CacheEntry, WatcherHandle};
use crate::cache::stats::{CacheStats, ShardStats};

// == Shard Map ==
/// Data guarded by the shard lock.
#[derive(Debug)]
struct ShardMap<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Next watcher generation handed out by this shard
    next_generation: u64,
}

// == Shard ==
/// A single cache partition.
#[derive(Debug)]
pub struct Shard<V> {
    map: RwLock<ShardMap<V>>,
    stats: ShardStats,
}

impl<V> Shard<V> {
    pub fn new() -> Self {
        Self {
            map: RwLock::new(ShardMap {
                entries: HashMap::new(),
                next_generation: 0,
            }),
            stats: ShardStats::new(),
        }
    }

    // Every critical section leaves the map consistent, so a panic in a
    // caller holding the lock cannot corrupt it.
    fn read(&self) -> RwLockReadGuard<'_, ShardMap<V>> {
        self.map.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ShardMap<V>> {
        self.map.write().unwrap_or_else(PoisonError::into_inner)
    }

    // == Insert ==
    /// Stores `value` under `key` without a TTL.
    ///
    /// A watcher attached to a previous value is cancelled inside the same
    /// critical section, so it can never remove the new value.
    pub fn insert(&self, key: String, value: V) {
        let mut map = self.write();
        if let Some(previous) = map.entries.insert(key, CacheEntry::new(value)) {
            previous.retire();
        }
        self.stats.record_set();
    }

    // == Insert Watched ==
    /// Stores `value` under `key` guarded by a new TTL watcher handle.
    ///
    /// Returns the watcher's generation and the receiver it must listen on
    /// for cancellation.
    pub fn insert_watched(&self, key: String, value: V) -> (u64, oneshot::Receiver<()>) {
        let mut map = self.write();
        let generation = map.next_generation;
        map.next_generation = map.next_generation.wrapping_add(1);

        let (handle, cancelled) = WatcherHandle::new(generation);
        if let Some(previous) = map
            .entries
            .insert(key, CacheEntry::with_watcher(value, handle))
        {
            previous.retire();
        }
        self.stats.record_set();

        (generation, cancelled)
    }

    // == Remove ==
    /// Deletes `key`, cancelling its watcher. Absent keys are a no-op.
    pub fn remove(&self, key: &str) -> Option<V> {
        let mut map = self.write();
        let entry = map.entries.remove(key)?;
        self.stats.record_removal();
        Some(entry.retire())
    }

    // == Expire ==
    /// Removes `key` only if it is still owned by the watcher of `generation`.
    ///
    /// Returns true when an entry was removed. A watcher whose entry was
    /// overwritten or removed in the meantime finds a different generation
    /// (or nothing) and leaves the shard untouched.
    pub fn expire(&self, key: &str, generation: u64) -> bool {
        let mut map = self.write();
        let owned = map
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_watched_by(generation));
        if owned {
            map.entries.remove(key);
            self.stats.record_expiry();
        }
        owned
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Adds this shard's counters into `total` under the shared lock.
    pub fn accumulate_stats(&self, total: &mut CacheStats) {
        let _guard = self.read();
        self.stats.accumulate_into(total);
    }

    pub fn stats(&self) -> &ShardStats {
        &self.stats
    }
}

impl<V: Clone> Shard<V> {
    // == Get ==
    /// Looks up `key` under the shared lock, counting a hit or a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let map = self.read();
        match map.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }
}

impl<V> Default for Shard<V> {
    fn default() -> Self {
        Self::new()
    }
}
