//! Cache Entry Module
//!
//! Defines individual cache entries and the cancellation handle of their TTL
//! watcher.

use tokio::sync::oneshot;

// == Watcher Handle ==
/// Handle to the background task watching an entry's TTL.
///
/// The generation ties the watcher to the exact entry it was created for: a
/// watcher only removes its key while the stored entry still carries the same
/// generation.
#[derive(Debug)]
pub struct WatcherHandle {
    generation: u64,
    cancel: oneshot::Sender<()>,
}

impl WatcherHandle {
    /// Creates a handle and the receiving half the watcher listens on.
    pub fn new(generation: u64) -> (Self, oneshot::Receiver<()>) {
        let (cancel, cancelled) = oneshot::channel();
        (Self { generation, cancel }, cancelled)
    }

    /// Generation of the entry this watcher belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // == Cancel ==
    /// Signals the watcher to stop.
    ///
    /// Never blocks: a oneshot send either lands in its single slot or fails
    /// because the watcher already finished, which is fine.
    pub fn cancel(self) {
        let _ = self.cancel.send(());
    }
}

// == Cache Entry ==
/// A stored value plus the watcher guarding its TTL, if any.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Live TTL watcher, None = no expiration
    pub watcher: Option<WatcherHandle>,
}

impl<V> CacheEntry<V> {
    /// Creates an entry that never expires.
    pub fn new(value: V) -> Self {
        Self {
            value,
            watcher: None,
        }
    }

    /// Creates an entry guarded by a TTL watcher.
    pub fn with_watcher(value: V, watcher: WatcherHandle) -> Self {
        Self {
            value,
            watcher: Some(watcher),
        }
    }

    /// Returns true if this entry is owned by the watcher of `generation`.
    pub fn is_watched_by(&self, generation: u64) -> bool {
        self.watcher
            .as_ref()
            .is_some_and(|w| w.generation() == generation)
    }

    // == Retire ==
    /// Cancels the entry's watcher (if any) and hands back the value.
    pub fn retire(self) -> V {
        if let Some(watcher) = self.watcher {
            watcher.cancel();
        }
        self.value
    }
}
