//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a plain HashMap model.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::cache::{shard_index, Cache};

// == Test Configuration ==
const TEST_SHARD_COUNTS: [usize; 4] = [1, 3, 16, 64];

// == Strategies ==
/// Generates cache keys; the empty key is valid too
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{0,32}".prop_map(|s| s)
}

/// Generates cache values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,64}".prop_map(|s| s)
}

fn shard_count_strategy() -> impl Strategy<Value = usize> {
    prop::sample::select(TEST_SHARD_COUNTS.to_vec())
}

/// A single cache operation
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // Small key space so operations collide
    let key = "[a-d]{1,2}";
    prop_oneof![
        (key, value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Remove { key }),
    ]
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // **Property: Statistics Accuracy**
    // For any sequence of operations, hits, misses, sets and removals match a
    // HashMap model driven by the same sequence.
    #[test]
    fn prop_statistics_accuracy(
        shard_count in shard_count_strategy(),
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let cache = Cache::builder().shard_count(shard_count).build().unwrap();
        let mut model: HashMap<String, String> = HashMap::new();
        let (mut hits, mut misses, mut sets, mut removed) = (0u64, 0u64, 0u64, 0u64);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key.clone(), value.clone());
                    model.insert(key, value);
                    sets += 1;
                }
                CacheOp::Get { key } => {
                    let got = cache.get(&key);
                    prop_assert_eq!(got.as_ref(), model.get(&key), "Value mismatch for {}", key);
                    if got.is_some() { hits += 1 } else { misses += 1 }
                }
                CacheOp::Remove { key } => {
                    let expected = model.remove(&key);
                    if expected.is_some() {
                        removed += 1;
                    }
                    prop_assert_eq!(cache.remove(&key), expected);
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, misses, "Misses mismatch");
        prop_assert_eq!(stats.sets, sets, "Sets mismatch");
        prop_assert_eq!(stats.removed, removed, "Removed mismatch");
        prop_assert_eq!(cache.len(), model.len(), "Entry count mismatch");
    }

    // **Property: Round-trip Storage Consistency**
    // Storing a pair and reading it back returns the stored value.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let cache = Cache::new();

        cache.set(key.clone(), value.clone());

        prop_assert_eq!(cache.get(&key), Some(value), "Round-trip value mismatch");
    }

    // **Property: Remove Deletes Entry**
    // After removing an existing key, a lookup misses; a second remove is a
    // no-op that does not count.
    #[test]
    fn prop_remove_deletes_entry(key in key_strategy(), value in value_strategy()) {
        let cache = Cache::new();

        cache.set(key.clone(), value.clone());
        prop_assert_eq!(cache.remove(&key), Some(value));
        prop_assert_eq!(cache.remove(&key), None);

        prop_assert!(cache.get(&key).is_none(), "Key should not exist after remove");
        prop_assert_eq!(cache.stats().removed, 1);
    }

    // **Property: Overwrite Semantics**
    // Storing V1 then V2 under one key leaves exactly V2.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let cache = Cache::new();

        cache.set(key.clone(), value1);
        cache.set(key.clone(), value2.clone());

        prop_assert_eq!(cache.get(&key), Some(value2), "Overwrite should return new value");
        prop_assert_eq!(cache.len(), 1, "Should have exactly one entry after overwrite");
    }

    // **Property: Stable Routing**
    // A key always lands on the same in-range shard.
    #[test]
    fn prop_routing_is_stable(key in ".{0,64}", shard_count in 1usize..256) {
        let first = shard_index(&key, shard_count);
        prop_assert!(first < shard_count);
        prop_assert_eq!(first, shard_index(&key, shard_count));
    }

    // **Property: Distinct Keys Are Isolated**
    // N distinct keys give N sets, N hits, N removals and then N misses.
    #[test]
    fn prop_distinct_key_counters(keys in prop::collection::hash_set(key_strategy(), 1..100)) {
        let cache = Cache::new();
        let n = keys.len() as u64;

        for key in &keys {
            cache.set(key.clone(), 1u32);
        }
        prop_assert_eq!(cache.stats().sets, n);

        for key in &keys {
            prop_assert!(cache.get(key).is_some());
        }
        prop_assert_eq!(cache.stats().hits, n);

        for key in &keys {
            cache.remove(key);
        }
        prop_assert_eq!(cache.stats().removed, n);

        for key in &keys {
            prop_assert!(cache.get(key).is_none());
        }
        prop_assert_eq!(cache.stats().misses, n);
    }
}

// Separate proptest block with fewer cases for TTL tests on virtual time
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // **Property: TTL Expiration Behavior**
    // An entry stored with a TTL is readable before the TTL elapses and gone
    // afterwards.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in key_strategy(),
        value in value_strategy(),
        ttl_secs in 1u64..120
    ) {
        let runtime = paused_runtime();
        let result: std::result::Result<(), TestCaseError> = runtime.block_on(async move {
            let cache = Cache::new();
            cache.set_with_ttl(key.clone(), value.clone(), ttl_secs).unwrap();

            prop_assert_eq!(cache.get(&key), Some(value), "Entry should exist before TTL expires");

            tokio::time::sleep(Duration::from_secs(ttl_secs) + Duration::from_millis(10)).await;

            prop_assert!(cache.get(&key).is_none(), "Entry should not be found after TTL expires");
            prop_assert_eq!(cache.stats().expired, 1);
            Ok(())
        });
        result?;
    }

    // **Property: Overwrite Voids Pending Expiry**
    // Whatever mix of TTL and plain stores hits a key, the last store decides
    // whether and when it expires.
    #[test]
    fn prop_last_store_wins(ttls in prop::collection::vec(prop::option::of(1u64..30), 1..8)) {
        let runtime = paused_runtime();
        let result: std::result::Result<(), TestCaseError> = runtime.block_on(async move {
            let cache = Cache::new();
            for (i, ttl) in ttls.iter().enumerate() {
                match ttl {
                    Some(secs) => cache.set_with_ttl("key", i, *secs).unwrap(),
                    None => cache.set("key", i),
                }
            }

            tokio::time::sleep(Duration::from_secs(60)).await;

            let last = ttls.len() - 1;
            match ttls[last] {
                Some(_) => prop_assert!(cache.get("key").is_none()),
                None => prop_assert_eq!(cache.get("key"), Some(last)),
            }

            let expected_expiries = u64::from(ttls[last].is_some());
            prop_assert_eq!(cache.stats().expired, expected_expiries);
            Ok(())
        });
        result?;
    }
}

#[test]
fn test_keys_spread_over_shards() {
    let cache: Cache<u32> = Cache::new();
    let shards: HashSet<usize> = (0..1000)
        .map(|i| shard_index(&format!("key{}", i), cache.shard_count()))
        .collect();

    assert_eq!(shards.len(), cache.shard_count());
}
