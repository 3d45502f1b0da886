//! memoria: a fixed-capacity, thread-safe LRU cache with asynchronous
//! recency tracking.
//!
//! Reads run under a shared lock and push best-effort touch events to a
//! background tracker thread; writes run under an exclusive lock and evict
//! synchronously. See the [`cache`] module for the architecture and the
//! consistency model.

pub mod builder;
pub mod cache;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;

mod tracker;
