//! Single-threaded LRU core: hash index + recency list.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────┐
//!   │                        LruCore<K, V>                           │
//!   │                                                                │
//!   │   ┌──────────────────────────────────────────────────────┐     │
//!   │   │  FxHashMap<K, NodeHandle>  (key index)               │     │
//!   │   └───────────────┬──────────────┬──────────────┬────────┘     │
//!   │                   │              │              │              │
//!   │                   ▼              ▼              ▼              │
//!   │   ┌──────────────────────────────────────────────────────┐     │
//!   │   │  RecencyList<Entry<K, V>>                            │     │
//!   │   │                                                      │     │
//!   │   │  head ──► [MRU] ◄──► [..] ◄──► [LRU] ◄── tail        │     │
//!   │   └──────────────────────────────────────────────────────┘     │
//!   └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each entry is owned by exactly one list node; the index holds only the
//! node's `NodeHandle` and is updated in the same operation that links or
//! unlinks the node. At every quiescent point `index.len() == list.len()`
//! and both equal [`LruCore::len`].
//!
//! Values are stored as `Arc<V>` so lookups hand out a reference-count bump
//! instead of cloning `V`. All operations are O(1) except [`keys`] and
//! [`clear`].
//!
//! `LruCore` is not thread-safe; [`Memoria`](crate::cache::Memoria) wraps it
//! in a `parking_lot::RwLock` and adds the asynchronous recency tracker. At
//! this layer [`get`](LruCore::get) applies its recency move synchronously,
//! since there is no tracker to defer to.
//!
//! [`keys`]: LruCore::keys

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ds::{NodeHandle, RecencyList};
use crate::error::ConfigError;

/// Key-value pair owned by one recency-list node.
#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: Arc<V>,
}

/// Fixed-capacity LRU cache core (single-threaded).
///
/// # Example
///
/// ```
/// use memoria::policy::lru::LruCore;
///
/// let mut cache: LruCore<u64, String> = LruCore::new(2).unwrap();
/// cache.insert(1, "one".to_string().into());
/// cache.insert(2, "two".to_string().into());
///
/// // Reading key 1 makes key 2 the eviction candidate.
/// cache.get(&1);
/// cache.insert(3, "three".to_string().into());
///
/// assert!(cache.contains(&1));
/// assert!(!cache.contains(&2));
/// assert!(cache.contains(&3));
/// ```
pub struct LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    index: FxHashMap<K, NodeHandle>,
    list: RecencyList<Entry<K, V>>,
    capacity: usize,
}

impl<K, V> LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a core with the given capacity.
    ///
    /// Fails with [`ConfigError`] when `capacity` is zero; a cache that can
    /// hold nothing is a configuration mistake, not a degenerate mode.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be greater than 0"));
        }
        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            list: RecencyList::with_capacity(capacity),
            capacity,
        })
    }

    /// Inserts or updates `key`, returning the previous value if any.
    ///
    /// An existing key is updated in place and moved to the MRU position.
    /// A new key is inserted at the MRU position; if that pushes the cache
    /// over capacity, exactly one entry (the current LRU) is evicted.
    pub fn insert(&mut self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        if let Some(&handle) = self.index.get(&key) {
            let previous = self
                .list
                .get_mut(handle)
                .map(|entry| std::mem::replace(&mut entry.value, value));
            self.list.move_to_front(handle);

            #[cfg(debug_assertions)]
            self.debug_validate_invariants();

            return previous;
        }

        let handle = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, handle);

        if self.list.len() > self.capacity {
            self.evict_lru();
        }

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();

        None
    }

    /// Gets a value, moving it to the MRU position.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let &handle = self.index.get(key)?;
        self.list.move_to_front(handle);
        self.list.get(handle).map(|entry| Arc::clone(&entry.value))
    }

    /// Gets a value without any recency effect.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        let &handle = self.index.get(key)?;
        self.list.get(handle).map(|entry| Arc::clone(&entry.value))
    }

    /// Looks up a key, returning its node handle along with the value.
    ///
    /// Performs no recency update; the concurrent read path calls this under
    /// the shared lock and enqueues the handle for the recency tracker.
    pub fn lookup(&self, key: &K) -> Option<(NodeHandle, Arc<V>)> {
        let &handle = self.index.get(key)?;
        self.list
            .get(handle)
            .map(|entry| (handle, Arc::clone(&entry.value)))
    }

    /// Moves the node behind `handle` to the MRU position.
    ///
    /// Returns `false` when the handle is stale (evicted or cleared since it
    /// was issued). Called by the recency tracker; never evicts and never
    /// touches the index.
    pub fn touch_handle(&mut self, handle: NodeHandle) -> bool {
        self.list.move_to_front(handle)
    }

    /// Marks `key` as most recently used without retrieving the value.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&handle) => self.list.move_to_front(handle),
            None => false,
        }
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        let handle = self.index.remove(key)?;
        let entry = self.list.remove(handle)?;

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();

        Some(entry.value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, Arc<V>)> {
        let evicted = self.evict_lru();

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();

        evicted
    }

    /// Peeks at the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &Arc<V>)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Returns `true` if `key` is present. No recency effect.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes all entries. Outstanding node handles become stale.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    /// Returns keys ordered least recently used first, most recently used
    /// last. O(n); intended for diagnostics.
    pub fn keys(&self) -> Vec<K> {
        self.list.iter_rev().map(|entry| entry.key.clone()).collect()
    }

    fn evict_lru(&mut self) -> Option<(K, Arc<V>)> {
        let entry = self.list.pop_back()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert!(self.list.len() <= self.capacity);
        assert_eq!(self.index.len(), self.list.len());
        self.list.debug_validate_invariants();
        for (key, &handle) in &self.index {
            let entry = self.list.get(handle).expect("index points at dead node");
            assert!(entry.key == *key);
        }
    }
}

impl<K, V> fmt::Debug for LruCore<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
