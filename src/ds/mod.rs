pub mod handle_arena;
pub mod recency_list;

pub use handle_arena::{HandleArena, NodeHandle};
pub use recency_list::RecencyList;
