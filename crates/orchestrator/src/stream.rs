//! Streaming turn processing.
//!
//! Fallback applies only before the first fragment reaches the consumer.
//! Once output has started, a provider failure terminates the stream with an
//! `Error` event rather than retrying; the consumer may already have shown
//! partial text, and a retry would produce a duplicate partial answer.

use parley_core::message::Message;
use parley_core::provider::GenerateRequest;
use parley_routing::registry::ModelDescriptor;
use parley_routing::router::{self, RouteConstraints};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::orchestrator::{Orchestrator, UNAVAILABLE_RESPONSE};

/// Events emitted while processing a streamed turn.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Partial response text.
    Fragment { content: String },

    /// The turn completed; `model_used` is the producing model, or "none".
    Done { model_used: String },

    /// The stream failed after output had started. Terminal.
    Error { message: String },
}

/// Outcome of streaming from one candidate model.
enum StreamAttempt {
    /// No fragment was emitted; the next candidate may be tried.
    NotStarted,
    /// The stream completed; carries the accumulated response text.
    Completed(String),
    /// The consumer dropped the receiver. Stop, commit nothing.
    Aborted,
    /// Failed after the first fragment; an `Error` event was sent.
    Interrupted,
}

impl Orchestrator {
    /// Process a turn as a stream of events.
    ///
    /// Production runs on a spawned task; dropping the returned receiver
    /// aborts it and the partial turn is never committed to memory.
    pub fn process_stream(
        self: &Arc<Self>,
        input: &str,
        session_id: &str,
        force_offline: bool,
    ) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(32);
        let orch = Arc::clone(self);
        let input = input.to_string();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            orch.run_stream(&input, &session_id, force_offline, tx).await;
        });
        rx
    }

    async fn run_stream(
        &self,
        input: &str,
        session_id: &str,
        force_offline: bool,
        tx: mpsc::Sender<StreamEvent>,
    ) {
        let messages = self.assemble_messages(session_id, input).await;

        let constraints = RouteConstraints {
            force_offline,
            allowed_providers: None,
        };
        let primary = match router::select(self.registry(), input, &constraints) {
            Ok(model) => model,
            Err(e) => {
                let response = e.to_string();
                self.finish_stream(&tx, session_id, input, &response, "none")
                    .await;
                return;
            }
        };

        match self.attempt_stream(&primary, &messages, &tx).await {
            StreamAttempt::Completed(text) => {
                self.commit_stream(&tx, session_id, input, &text, &primary.name)
                    .await;
                return;
            }
            StreamAttempt::Aborted | StreamAttempt::Interrupted => return,
            StreamAttempt::NotStarted => {}
        }

        for candidate in self.fallback_chain(&primary.name, force_offline).await {
            info!(model = %candidate.name, "Trying fallback model (streaming)");
            match self.attempt_stream(&candidate, &messages, &tx).await {
                StreamAttempt::Completed(text) => {
                    self.commit_stream(&tx, session_id, input, &text, &candidate.name)
                        .await;
                    return;
                }
                StreamAttempt::Aborted | StreamAttempt::Interrupted => return,
                StreamAttempt::NotStarted => continue,
            }
        }

        self.finish_stream(&tx, session_id, input, UNAVAILABLE_RESPONSE, "none")
            .await;
    }

    /// Stream one candidate's output through to the consumer.
    async fn attempt_stream(
        &self,
        model: &ModelDescriptor,
        messages: &[Message],
        tx: &mpsc::Sender<StreamEvent>,
    ) -> StreamAttempt {
        let provider = match self.providers().get(&model.provider) {
            Some(p) => p,
            None => {
                warn!(provider = %model.provider, "No adapter registered for provider");
                return StreamAttempt::NotStarted;
            }
        };

        if !provider.is_available().await {
            return StreamAttempt::NotStarted;
        }

        let mut request = GenerateRequest::new(&model.name, messages.to_vec());
        request.max_tokens = self.config().max_tokens;
        request.temperature = self.config().temperature;

        let mut chunks = match provider.generate_stream(request).await {
            Ok(rx) => rx,
            Err(e) => {
                warn!(model = %model.name, error = %e, "Stream setup failed");
                return StreamAttempt::NotStarted;
            }
        };

        let mut accumulated = String::new();
        let mut started = false;

        while let Some(item) = chunks.recv().await {
            match item {
                Ok(chunk) => {
                    if let Some(content) = chunk.content {
                        if !content.is_empty() {
                            let event = StreamEvent::Fragment {
                                content: content.clone(),
                            };
                            if tx.send(event).await.is_err() {
                                return StreamAttempt::Aborted;
                            }
                            accumulated.push_str(&content);
                            started = true;
                        }
                    }
                    if chunk.done {
                        if !started {
                            warn!(model = %model.name, "Stream completed without content");
                            return StreamAttempt::NotStarted;
                        }
                        return StreamAttempt::Completed(accumulated);
                    }
                }
                Err(e) => {
                    if !started {
                        warn!(model = %model.name, error = %e, "Stream failed before first fragment");
                        return StreamAttempt::NotStarted;
                    }
                    warn!(model = %model.name, error = %e, "Stream interrupted mid-response");
                    let _ = tx
                        .send(StreamEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                    return StreamAttempt::Interrupted;
                }
            }
        }

        // Channel closed without a done chunk: a clean end if output started.
        // An empty stream counts as a failed attempt either way, so the
        // fallback chain still runs instead of committing an empty turn.
        if started {
            StreamAttempt::Completed(accumulated)
        } else {
            StreamAttempt::NotStarted
        }
    }

    /// Commit a completed streamed turn and signal the consumer.
    async fn commit_stream(
        &self,
        tx: &mpsc::Sender<StreamEvent>,
        session_id: &str,
        input: &str,
        response: &str,
        model_used: &str,
    ) {
        self.memory()
            .save_interaction(session_id, input, response)
            .await;
        let _ = tx
            .send(StreamEvent::Done {
                model_used: model_used.to_string(),
            })
            .await;
    }

    /// Emit a whole response as a single fragment, then complete the turn.
    /// Used for routing dead-ends and provider exhaustion.
    async fn finish_stream(
        &self,
        tx: &mpsc::Sender<StreamEvent>,
        session_id: &str,
        input: &str,
        response: &str,
        model_used: &str,
    ) {
        let event = StreamEvent::Fragment {
            content: response.to_string(),
        };
        if tx.send(event).await.is_err() {
            // Consumer is gone: nothing was delivered, commit nothing
            return;
        }
        self.commit_stream(tx, session_id, input, response, model_used)
            .await;
    }
}
