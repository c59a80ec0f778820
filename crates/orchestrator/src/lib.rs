//! Turn orchestration: routes each user message to a model, generates with
//! sequential fallback across providers, and commits completed turns to
//! memory. Both the blocking and streaming entry points always terminate
//! with a textual result.

pub mod orchestrator;
pub mod stream;

#[cfg(test)]
mod testing;

pub use orchestrator::{ChatOutcome, Orchestrator};
pub use stream::StreamEvent;
