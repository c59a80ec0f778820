//! Provider trait — the abstraction over text-generation backends.
//!
//! A Provider knows how to send a conversation to an LLM backend and get a
//! response back, either as a complete string or as a stream of fragments.
//!
//! Implementations: OpenAI-compatible (Groq, OpenRouter), Ollama.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// Configuration for a single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The model to use (e.g., "llama-3.1-8b-instant")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature (0.0 = deterministic, 2.0 = maximum variety)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.7
}

impl GenerateRequest {
    /// Build a request with the default sampling settings.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// A single fragment in a streaming response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Partial content delta
    #[serde(default)]
    pub content: Option<String>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,
}

impl StreamChunk {
    /// A content-carrying fragment.
    pub fn fragment(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            done: false,
        }
    }

    /// The terminal chunk of a completed stream.
    pub fn done() -> Self {
        Self {
            content: None,
            done: true,
        }
    }
}

/// The capability contract every backend adapter implements.
///
/// The router and orchestrator depend only on this trait — no adapter may
/// leak backend-specific error types past it; all failures are translated
/// into [`ProviderError`].
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "groq", "ollama").
    fn name(&self) -> &str;

    /// Send a request and get the complete response text.
    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<String, ProviderError>;

    /// Send a request and get a stream of response fragments.
    ///
    /// The sequence ends with a chunk whose `done` flag is set. A mid-stream
    /// failure surfaces as an `Err` item and terminates the sequence;
    /// fragments already yielded are not retried.
    ///
    /// Default implementation calls `generate()` and yields the full text as
    /// a single fragment.
    async fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        let text = self.generate(request).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(2);
        let _ = tx.send(Ok(StreamChunk::fragment(text))).await;
        let _ = tx.send(Ok(StreamChunk::done())).await;
        Ok(rx)
    }

    /// Cheap liveness/configuration check.
    ///
    /// Must not fail — a probe error collapses to `false`.
    async fn is_available(&self) -> bool;
}
