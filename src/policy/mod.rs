pub mod lru;

pub use lru::LruCore;
