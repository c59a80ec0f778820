//! Stub providers for orchestrator tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parley_core::error::ProviderError;
use parley_core::provider::{GenerateRequest, Provider, StreamChunk};
use tokio::sync::mpsc;

pub(crate) enum StubBehavior {
    /// `generate` succeeds with this text; streaming yields it as one fragment.
    Succeed(String),
    /// Every call fails with an upstream error.
    Fail,
    /// `is_available` reports false; calls still fail if made.
    Unavailable,
    /// Streaming yields these fragments then a done chunk.
    StreamFragments(Vec<String>),
    /// Streaming yields these fragments then an error item.
    StreamErrorAfter(Vec<String>),
    /// Streaming yields these fragments then stalls without completing.
    StreamStallAfter(Vec<String>),
    /// `generate_stream` returns a channel whose first item is an error.
    StreamErrorImmediately,
}

pub(crate) struct StubProvider {
    name: String,
    behavior: StubBehavior,
    calls: AtomicUsize,
}

impl StubProvider {
    pub(crate) fn new(name: &str, behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn upstream_error(&self) -> ProviderError {
        ProviderError::ApiError {
            status_code: 500,
            message: format!("{} is broken", self.name),
        }
    }
}

pub(crate) fn succeeding(name: &str, text: &str) -> Arc<StubProvider> {
    StubProvider::new(name, StubBehavior::Succeed(text.into()))
}

pub(crate) fn failing(name: &str) -> Arc<StubProvider> {
    StubProvider::new(name, StubBehavior::Fail)
}

pub(crate) fn unavailable(name: &str) -> Arc<StubProvider> {
    StubProvider::new(name, StubBehavior::Unavailable)
}

pub(crate) fn streaming(name: &str, fragments: &[&str]) -> Arc<StubProvider> {
    StubProvider::new(
        name,
        StubBehavior::StreamFragments(fragments.iter().map(|s| s.to_string()).collect()),
    )
}

pub(crate) fn stream_breaking(name: &str, fragments: &[&str]) -> Arc<StubProvider> {
    StubProvider::new(
        name,
        StubBehavior::StreamErrorAfter(fragments.iter().map(|s| s.to_string()).collect()),
    )
}

pub(crate) fn stream_stalling(name: &str, fragments: &[&str]) -> Arc<StubProvider> {
    StubProvider::new(
        name,
        StubBehavior::StreamStallAfter(fragments.iter().map(|s| s.to_string()).collect()),
    )
}

pub(crate) fn stream_dead(name: &str) -> Arc<StubProvider> {
    StubProvider::new(name, StubBehavior::StreamErrorImmediately)
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, _request: GenerateRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            StubBehavior::Succeed(text) => Ok(text.clone()),
            _ => Err(self.upstream_error()),
        }
    }

    async fn generate_stream(
        &self,
        _request: GenerateRequest,
    ) -> Result<mpsc::Receiver<Result<StreamChunk, ProviderError>>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(16);
        match &self.behavior {
            StubBehavior::Succeed(text) => {
                let _ = tx.send(Ok(StreamChunk::fragment(text.clone()))).await;
                let _ = tx.send(Ok(StreamChunk::done())).await;
            }
            StubBehavior::Fail | StubBehavior::Unavailable => {
                return Err(self.upstream_error());
            }
            StubBehavior::StreamFragments(fragments) => {
                for f in fragments {
                    let _ = tx.send(Ok(StreamChunk::fragment(f.clone()))).await;
                }
                let _ = tx.send(Ok(StreamChunk::done())).await;
            }
            StubBehavior::StreamErrorAfter(fragments) => {
                for f in fragments {
                    let _ = tx.send(Ok(StreamChunk::fragment(f.clone()))).await;
                }
                let _ = tx
                    .send(Err(ProviderError::StreamInterrupted("upstream reset".into())))
                    .await;
            }
            StubBehavior::StreamStallAfter(fragments) => {
                let fragments = fragments.clone();
                tokio::spawn(async move {
                    for f in fragments {
                        let _ = tx.send(Ok(StreamChunk::fragment(f))).await;
                    }
                    // Hold the sender open so the stream never completes
                    tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                    drop(tx);
                });
            }
            StubBehavior::StreamErrorImmediately => {
                let _ = tx
                    .send(Err(ProviderError::Network("connection dropped".into())))
                    .await;
            }
        }
        Ok(rx)
    }

    async fn is_available(&self) -> bool {
        !matches!(self.behavior, StubBehavior::Unavailable)
    }
}
