//! Builder for configuring a [`Memoria`] cache before construction.
//!
//! [`Memoria::new`] covers the common case; the builder exists for the one
//! extra knob (the depth of the recency event queue) and as the place
//! future construction options land.
//!
//! # Example
//!
//! ```
//! use memoria::builder::MemoriaBuilder;
//! use memoria::cache::Memoria;
//!
//! let cache: Memoria<u64, String> = MemoriaBuilder::new(512)
//!     .event_queue_capacity(4096)
//!     .try_build()
//!     .unwrap();
//! assert_eq!(cache.capacity(), 512);
//! ```

use std::hash::Hash;

use crate::cache::Memoria;
use crate::error::ConfigError;

/// Depth of the recency event queue when none is configured. Deep enough to
/// absorb read bursts; overflow only costs ordering freshness.
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 1024;

/// Builder for [`Memoria`].
///
/// Validation happens in [`try_build`](Self::try_build), not in the
/// setters, so the builder itself is infallible to assemble.
#[derive(Debug, Clone)]
pub struct MemoriaBuilder {
    capacity: usize,
    event_queue_capacity: usize,
}

impl MemoriaBuilder {
    /// Starts a builder for a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
        }
    }

    /// Sets the depth of the bounded queue between the read path and the
    /// recency tracker.
    ///
    /// A deeper queue drops fewer touch events under read bursts at the cost
    /// of memory; dropped events never affect lookup results, only how soon
    /// a read protects its entry from eviction.
    pub fn event_queue_capacity(mut self, depth: usize) -> Self {
        self.event_queue_capacity = depth;
        self
    }

    /// Builds the cache and starts its recency tracker thread.
    ///
    /// Fails with [`ConfigError`] when the capacity or the event queue depth
    /// is zero.
    pub fn try_build<K, V>(self) -> Result<Memoria<K, V>, ConfigError>
    where
        K: Clone + Eq + Hash + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        Memoria::with_event_queue(self.capacity, self.event_queue_capacity)
    }
}
