//! TTL Expiry Watcher
//!
//! One background task per TTL entry. The task races a one-shot timer against
//! the entry's cancellation channel and then removes its own generation of the
//! key, exactly once.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::cache::Shard;

/// Spawns the watcher for one TTL entry on `runtime`.
///
/// The watcher holds only a weak reference to its shard: it never keeps a
/// dropped cache alive, and it does not touch the shard lock while waiting.
///
/// # Arguments
/// * `runtime` - Runtime the watcher task runs on
/// * `shard` - Shard that owns `key`
/// * `key` - Key to expire
/// * `generation` - Generation of the entry this watcher guards
/// * `ttl` - Time until expiry
/// * `cancelled` - Fires (or closes) when the entry is overwritten or removed
pub fn spawn_expiry_watcher<V>(
    runtime: &Handle,
    shard: Weak<Shard<V>>,
    key: String,
    generation: u64,
    ttl: Duration,
    cancelled: oneshot::Receiver<()>,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    runtime.spawn(async move {
        trace!(key = %key, generation, ?ttl, "TTL watcher started");

        // A closed channel means the handle was dropped with its entry,
        // which is a cancellation as well.
        let timed_out = tokio::select! {
            _ = tokio::time::sleep(ttl) => true,
            _ = cancelled => false,
        };

        let Some(shard) = shard.upgrade() else {
            trace!(key = %key, "TTL watcher outlived its cache");
            return;
        };

        if shard.expire(&key, generation) {
            debug!(key = %key, generation, "TTL expired, entry removed");
        } else if timed_out {
            trace!(key = %key, generation, "TTL elapsed for a superseded entry");
        } else {
            trace!(key = %key, generation, "TTL watcher cancelled");
        }
    })
}
