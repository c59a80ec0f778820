//! Backend adapters for parley.
//!
//! All adapters implement the `parley_core::Provider` trait and translate
//! every backend-specific failure into `ProviderError` — nothing else
//! crosses the contract boundary.

pub mod catalog;
pub mod ollama;
pub mod openai_compat;

pub use catalog::{build_providers, build_registry};
pub use ollama::OllamaProvider;
pub use openai_compat::OpenAiCompatProvider;
