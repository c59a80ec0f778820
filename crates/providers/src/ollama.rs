//! Ollama provider — local inference over the native Ollama HTTP API.
//!
//! Uses `/api/chat` for generation (JSON, NDJSON when streaming) and
//! `/api/tags` as a cheap reachability probe. Ollama needs no credentials;
//! availability means the daemon answers on its port.

use async_trait::async_trait;
use futures::StreamExt;
use parley_core::error::ProviderError;
use parley_core::provider::{GenerateRequest, StreamChunk};
use serde::Deserialize;
use tracing::{debug, trace};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// A provider backed by a local Ollama instance.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
    probe_client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider. `base_url` defaults to localhost:11434.
    pub fn new(base_url: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        // Availability probes must stay cheap
        let probe_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(3))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            client,
            probe_client,
        }
    }

    fn body(request: &GenerateRequest, stream: bool) -> serde_json::Value {
        serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "stream": stream,
            "options": {
                "num_predict": request.max_tokens,
                "temperature": request.temperature,
            },
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_connect() {
            ProviderError::Network(format!(
                "Cannot connect to Ollama at {}. Is it running?",
                self.base_url
            ))
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl parley_core::Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<String, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(model = %request.model, "Sending Ollama chat request");

        let response = self
            .client
            .post(&url)
            .json(&Self::body(&request, false))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("Failed to parse Ollama response: {e}"))
        })?;

        Ok(api_response.message.map(|m| m.content).unwrap_or_default())
    }

    async fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        let url = format!("{}/api/chat", self.base_url);
        debug!(model = %request.model, "Sending Ollama streaming request");

        let response = self
            .client
            .post(&url)
            .json(&Self::body(&request, true))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        // Ollama streams newline-delimited JSON objects
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() {
                        continue;
                    }

                    match serde_json::from_str::<ChatResponse>(&line) {
                        Ok(chunk) => {
                            if let Some(message) = &chunk.message {
                                if !message.content.is_empty()
                                    && tx
                                        .send(Ok(StreamChunk::fragment(&message.content)))
                                        .await
                                        .is_err()
                                {
                                    return; // receiver dropped
                                }
                            }
                            if chunk.done {
                                let _ = tx.send(Ok(StreamChunk::done())).await;
                                return;
                            }
                        }
                        Err(e) => {
                            trace!(line = %line, error = %e, "Ignoring unparseable Ollama chunk");
                        }
                    }
                }
            }

            let _ = tx.send(Ok(StreamChunk::done())).await;
        });

        Ok(rx)
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.probe_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

// --- Ollama API types (internal) ---

/// One `/api/chat` response object (complete, or one NDJSON stream line).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}
