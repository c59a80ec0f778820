//! Memory system for parley.
//!
//! - [`short_term`]: bounded per-session turn buffer with pinned system
//!   messages
//! - [`in_memory`] / [`file_store`]: long-term `MemoryStore` implementations
//! - [`manager`]: blends both memories into one ordered context

pub mod file_store;
pub mod in_memory;
pub mod manager;
pub mod short_term;

mod relevance;

pub use file_store::FileStore;
pub use in_memory::InMemoryStore;
pub use manager::MemoryManager;
pub use short_term::ShortTermMemory;
