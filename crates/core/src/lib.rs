//! # Parley Core
//!
//! Domain types, traits, and error definitions for the parley conversational
//! gateway. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every pluggable subsystem is defined as a trait here. Implementations live
//! in their respective crates. This enables:
//! - Swapping backends via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod memory;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, MemoryError, ProviderError, Result, RoutingError};
pub use memory::{MemoryStore, MemoryRecord, RecordMetadata};
pub use message::{Message, Role};
pub use provider::{GenerateRequest, Provider, StreamChunk};
