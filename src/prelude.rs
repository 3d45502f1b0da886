//! Convenience re-exports of the commonly used types.
//!
//! ```
//! use memoria::prelude::*;
//!
//! let cache: Memoria<u64, String> = Memoria::new(100).unwrap();
//! cache.put(1, "one".to_string());
//! assert!(cache.contains(&1));
//! ```

pub use crate::builder::MemoriaBuilder;
pub use crate::cache::Memoria;
pub use crate::ds::{HandleArena, NodeHandle, RecencyList};
pub use crate::error::ConfigError;
pub use crate::policy::lru::LruCore;
