//! Concurrent LRU cache engine with asynchronous recency tracking.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │                         Memoria<K, V>                             │
//!   │                                                                   │
//!   │   readers                writers               lifecycle          │
//!   │   get / peek / len       put / remove          close (once)       │
//!   │   keys / contains        clear / pop_lru                          │
//!   │      │                      │                      │              │
//!   │      ▼ shared lock          ▼ exclusive lock       ▼              │
//!   │   ┌───────────────────────────────────────────────────────┐       │
//!   │   │            RwLock<LruCore<K, V>>  +  closed flag      │       │
//!   │   └───────────────────────────────────────────────────────┘       │
//!   │      │                                             ▲              │
//!   │      │ try_send(NodeHandle)                        │ exclusive    │
//!   │      ▼                                             │ lock         │
//!   │   ┌─────────────────────────┐      ┌──────────────────────────┐   │
//!   │   │  bounded event queue    │ ───► │  recency tracker thread  │   │
//!   │   │  (best-effort)          │      │  revalidate + move front │   │
//!   │   └─────────────────────────┘      └──────────────────────────┘   │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency model
//!
//! - `put` is fully synchronous: its recency effect (move to MRU) and any
//!   eviction are visible to every lock-acquiring observer the moment it
//!   returns.
//! - `get` returns the value from under the shared lock and only *enqueues*
//!   a recency event. The move to MRU happens later, when the tracker
//!   acquires the exclusive lock, or never, if the queue was full or the
//!   cache closed first. Lookup correctness is unaffected; only ordering
//!   freshness is. Tests must let the tracker drain before asserting order.
//! - `len`, `contains`, and key presence are strongly consistent: eviction
//!   happens only inside `put`/`pop_lru` under the exclusive lock.
//!
//! ## Lifecycle
//!
//! `close` is idempotent and safe under concurrent callers: the first caller
//! to flip the closed flag clears the index and list; everyone else returns
//! immediately. After close, `get` misses for every key and the mutators are
//! no-ops. The tracker observes the flag and stops without draining its
//! queue. `Drop` closes the cache and joins the tracker thread.
//!
//! Share a `Memoria` between threads via `Arc`; every method takes `&self`.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Mutex, RwLock};

use crate::builder::DEFAULT_EVENT_QUEUE_CAPACITY;
use crate::ds::NodeHandle;
use crate::error::ConfigError;
use crate::policy::lru::LruCore;
use crate::tracker;

/// State shared between the cache handle and the recency tracker thread.
pub(crate) struct Shared<K, V>
where
    K: Clone + Eq + Hash,
{
    pub(crate) core: RwLock<LruCore<K, V>>,
    /// One-way flag. Set exactly once by the first `close` caller; checked
    /// by every operation and by the tracker loop.
    pub(crate) closed: AtomicBool,
}

/// Fixed-capacity, thread-safe LRU cache.
///
/// Reads take a shared lock and never wait for the recency list: each hit
/// enqueues a best-effort "touch" event that a background tracker applies
/// later under the exclusive lock. Writes are synchronous and may evict the
/// least recently used entry.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use memoria::cache::Memoria;
///
/// let cache: Memoria<u64, String> = Memoria::new(100).unwrap();
/// cache.put(1, "one".to_string());
/// assert_eq!(cache.get(&1).as_deref(), Some(&"one".to_string()));
/// assert_eq!(cache.get(&2), None);
///
/// // Shared across threads via Arc; every method takes &self.
/// let cache = Arc::new(cache);
/// let worker = {
///     let cache = Arc::clone(&cache);
///     std::thread::spawn(move || {
///         cache.put(2, "two".to_string());
///     })
/// };
/// worker.join().unwrap();
/// assert_eq!(cache.len(), 2);
///
/// cache.close();
/// assert_eq!(cache.get(&1), None);
/// ```
pub struct Memoria<K, V>
where
    K: Clone + Eq + Hash,
{
    shared: Arc<Shared<K, V>>,
    events: SyncSender<NodeHandle>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<K, V> Memoria<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Creates a cache with the given capacity and the default event queue
    /// depth, and starts its recency tracker.
    ///
    /// Fails with [`ConfigError`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_event_queue(capacity, DEFAULT_EVENT_QUEUE_CAPACITY)
    }

    pub(crate) fn with_event_queue(
        capacity: usize,
        event_queue_capacity: usize,
    ) -> Result<Self, ConfigError> {
        if event_queue_capacity == 0 {
            return Err(ConfigError::new(
                "event queue capacity must be greater than 0",
            ));
        }
        let core = LruCore::new(capacity)?;
        let shared = Arc::new(Shared {
            core: RwLock::new(core),
            closed: AtomicBool::new(false),
        });
        let (events, receiver) = mpsc::sync_channel(event_queue_capacity);
        let worker = tracker::spawn(Arc::clone(&shared), receiver);
        Ok(Self {
            shared,
            events,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Gets the value for `key`, marking it recently used.
    ///
    /// The lookup runs under the shared lock; the recency update is handed
    /// to the background tracker with a non-blocking send and may be dropped
    /// when the queue is full or the cache is closed. The returned value is
    /// correct either way.
    ///
    /// Returns `None` for absent keys and for every key once the cache is
    /// closed.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let hit = {
            let core = self.shared.core.read();
            core.lookup(key)
        };
        let (handle, value) = hit?;
        if !self.shared.closed.load(Ordering::Acquire) {
            // Best-effort: a full queue only delays reordering.
            let _ = self.events.try_send(handle);
        }
        Some(value)
    }

    /// Gets the value for `key` without any recency effect.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        let core = self.shared.core.read();
        core.peek(key)
    }

    /// Inserts or updates `key`, returning the previous value if any.
    ///
    /// Runs entirely under the exclusive lock. An existing key is updated in
    /// place and moved to the MRU position immediately; unlike `get`, the
    /// recency effect of `put` is visible as soon as it returns. A new key
    /// that overflows the capacity evicts exactly the current LRU entry.
    ///
    /// No-op when the cache is closed.
    pub fn put(&self, key: K, value: V) -> Option<Arc<V>> {
        self.put_arc(key, Arc::new(value))
    }

    /// Inserts a pre-wrapped `Arc<V>` directly.
    pub fn put_arc(&self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        let mut core = self.shared.core.write();
        if self.shared.closed.load(Ordering::Acquire) {
            return None;
        }
        core.insert(key, value)
    }

    /// Removes `key` and returns its value. No-op when closed.
    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        let mut core = self.shared.core.write();
        if self.shared.closed.load(Ordering::Acquire) {
            return None;
        }
        core.remove(key)
    }

    /// Removes and returns the least recently used entry. No-op when closed.
    pub fn pop_lru(&self) -> Option<(K, Arc<V>)> {
        let mut core = self.shared.core.write();
        if self.shared.closed.load(Ordering::Acquire) {
            return None;
        }
        core.pop_lru()
    }

    /// Peeks at the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(K, Arc<V>)> {
        let core = self.shared.core.read();
        core.peek_lru().map(|(k, v)| (k.clone(), Arc::clone(v)))
    }

    /// Removes all entries. No-op when closed.
    pub fn clear(&self) {
        let mut core = self.shared.core.write();
        if self.shared.closed.load(Ordering::Acquire) {
            return;
        }
        core.clear();
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        let core = self.shared.core.read();
        core.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> usize {
        let core = self.shared.core.read();
        core.capacity()
    }

    /// Returns `true` if `key` is present. No recency effect.
    pub fn contains(&self, key: &K) -> bool {
        let core = self.shared.core.read();
        core.contains(key)
    }

    /// Returns keys ordered least recently used first, most recently used
    /// last.
    ///
    /// Taken under the shared lock, which excludes writers for the duration
    /// of the traversal. Recency updates from recent `get` calls may not be
    /// reflected yet. Intended for diagnostics.
    pub fn keys(&self) -> Vec<K> {
        let core = self.shared.core.read();
        core.keys()
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Closes the cache: signals the recency tracker to stop and releases
    /// all entries.
    ///
    /// Idempotent and safe under concurrent callers; the teardown runs
    /// exactly once, on the first caller. Returns without waiting for the
    /// tracker to drain; queued recency events are discarded. Afterwards
    /// `get` misses for every key and `put`/`clear`/`remove` are no-ops.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut core = self.shared.core.write();
        core.clear();
    }
}

impl<K, V> Drop for Memoria<K, V>
where
    K: Clone + Eq + Hash,
{
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

impl<K, V> fmt::Debug for Memoria<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.shared.core.read();
        f.debug_struct("Memoria")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .field("closed", &self.shared.closed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Polls `keys()` until it matches `expected` or the deadline passes.
    /// Recency effects of `get` are eventual; never assert them directly.
    fn wait_for_keys(cache: &Memoria<u32, u32>, expected: &[u32]) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cache.keys() == expected {
                return true;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn construction_validates_capacity() {
        assert!(Memoria::<u32, u32>::new(0).is_err());
        assert!(Memoria::<u32, u32>::new(1).is_ok());
    }

    #[test]
    fn put_get_and_len() {
        let cache = Memoria::new(3).unwrap();
        assert!(cache.is_empty());

        cache.put(1, 10);
        cache.put(2, 20);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 3);

        assert_eq!(cache.get(&1).map(|v| *v), Some(10));
        assert_eq!(cache.get(&3), None);
        assert!(cache.contains(&2));
        assert!(!cache.contains(&3));
    }

    #[test]
    fn put_returns_previous_value() {
        let cache = Memoria::new(3).unwrap();
        assert!(cache.put(1, 10).is_none());
        assert_eq!(cache.put(1, 11).map(|v| *v), Some(10));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_arc_shares_the_value() {
        let cache: Memoria<u32, String> = Memoria::new(2).unwrap();
        let shared = Arc::new("shared".to_string());
        cache.put_arc(1, Arc::clone(&shared));
        let retrieved = cache.get(&1).unwrap();
        assert!(Arc::ptr_eq(&shared, &retrieved));
    }

    #[test]
    fn overflow_evicts_lru() {
        let cache = Memoria::new(2).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2).map(|v| *v), Some(20));
        assert_eq!(cache.get(&3).map(|v| *v), Some(30));
    }

    #[test]
    fn get_eventually_reorders() {
        let cache = Memoria::new(3).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);
        assert_eq!(cache.keys(), vec![1, 2, 3]);

        cache.get(&1);
        assert!(wait_for_keys(&cache, &[2, 3, 1]));
    }

    #[test]
    fn peek_never_reorders() {
        let cache = Memoria::new(3).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);

        assert_eq!(cache.peek(&1).map(|v| *v), Some(10));
        // No event was queued, so the order is stable; a short grace
        // period would not change it.
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.keys(), vec![1, 2, 3]);
    }

    #[test]
    fn remove_and_pop_lru() {
        let cache = Memoria::new(3).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);

        assert_eq!(cache.remove(&2).map(|v| *v), Some(20));
        assert_eq!(cache.remove(&2), None);

        assert_eq!(cache.peek_lru().map(|(k, v)| (k, *v)), Some((1, 10)));
        assert_eq!(cache.pop_lru().map(|(k, v)| (k, *v)), Some((1, 10)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_then_reuse() {
        let cache = Memoria::new(3).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.clear();
        assert!(cache.is_empty());

        cache.put(4, 40);
        assert_eq!(cache.get(&4).map(|v| *v), Some(40));
        assert_eq!(cache.keys(), vec![4]);
    }

    #[test]
    fn close_makes_cache_inert() {
        let cache = Memoria::new(3).unwrap();
        cache.put(1, 10);
        cache.close();

        assert!(cache.is_closed());
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);

        cache.put(2, 20);
        assert_eq!(cache.len(), 0);
        cache.clear();
        assert_eq!(cache.remove(&1), None);
        assert!(cache.keys().is_empty());

        // Idempotent.
        cache.close();
        assert!(cache.is_closed());
    }

    #[test]
    fn get_between_queue_and_close_stays_correct() {
        // A hit taken just before close must still return its value even
        // though the recency event is suppressed.
        let cache = Memoria::new(2).unwrap();
        cache.put(1, 10);
        let value = cache.get(&1);
        cache.close();
        assert_eq!(value.map(|v| *v), Some(10));
    }

    #[test]
    fn debug_output_reports_state() {
        let cache: Memoria<u32, u32> = Memoria::new(2).unwrap();
        cache.put(1, 10);
        let dbg = format!("{:?}", cache);
        assert!(dbg.contains("Memoria"));
        assert!(dbg.contains("len: 1"));
        assert!(dbg.contains("capacity: 2"));
    }
}
