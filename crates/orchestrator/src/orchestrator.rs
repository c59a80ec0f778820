//! The orchestrator — connects config, memory, routing, and providers.
//!
//! Every `process_message` call terminates with a textual response. Routing
//! dead-ends and provider exhaustion both become normal assistant turns, so
//! the transport layer above never has to handle a generation failure.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parley_config::AppConfig;
use parley_core::message::Message;
use parley_core::provider::{GenerateRequest, Provider};
use parley_memory::MemoryManager;
use parley_routing::registry::{ModelDescriptor, ModelRegistry};
use parley_routing::router::{self, RouteConstraints};
use tracing::{info, warn};

pub(crate) const SYSTEM_PROMPT: &str = "You are Parley, a conversational AI assistant. \
    You are multilingual and can respond fluently in both Uzbek and English. \
    Always detect the language of the user's message and reply in the same language. \
    You are helpful, concise, and precise. \
    If asked who you are, introduce yourself as Parley, an AI assistant.";

/// Returned when every eligible provider has failed or none were eligible.
pub(crate) const UNAVAILABLE_RESPONSE: &str =
    "I'm currently unavailable. Please check your API key or internet connection.";

/// The result of one completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    /// The assistant's response text
    pub response: String,

    /// Name of the model that produced the response, or "none"
    pub model_used: String,

    /// Wall-clock generation time in seconds, rounded to milliseconds
    pub response_time: f64,
}

/// A single shared instance serves all sessions concurrently.
pub struct Orchestrator {
    config: AppConfig,
    registry: ModelRegistry,
    providers: HashMap<String, Arc<dyn Provider>>,
    memory: MemoryManager,
}

impl Orchestrator {
    pub fn new(
        config: AppConfig,
        registry: ModelRegistry,
        providers: HashMap<String, Arc<dyn Provider>>,
        memory: MemoryManager,
    ) -> Self {
        Self {
            config,
            registry,
            providers,
            memory,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn providers(&self) -> &HashMap<String, Arc<dyn Provider>> {
        &self.providers
    }

    /// Process a user message end-to-end: recall memory, route, generate
    /// with fallback, commit the completed turn.
    pub async fn process_message(
        &self,
        input: &str,
        session_id: &str,
        force_offline: bool,
    ) -> ChatOutcome {
        let start = Instant::now();
        let messages = self.assemble_messages(session_id, input).await;

        let constraints = RouteConstraints {
            force_offline,
            allowed_providers: None,
        };
        let primary = match router::select(&self.registry, input, &constraints) {
            Ok(model) => model,
            Err(e) => {
                // A routing dead-end is a normal assistant turn, recorded
                // like any other
                let response = e.to_string();
                self.memory
                    .save_interaction(session_id, input, &response)
                    .await;
                return ChatOutcome {
                    response,
                    model_used: "none".into(),
                    response_time: round_secs(start.elapsed().as_secs_f64()),
                };
            }
        };

        let (response, model_used) = self
            .generate_with_fallback(&primary, messages, force_offline)
            .await;

        self.memory
            .save_interaction(session_id, input, &response)
            .await;

        ChatOutcome {
            response,
            model_used,
            response_time: round_secs(start.elapsed().as_secs_f64()),
        }
    }

    /// System prompt, then recalled + short-term context, then the new turn.
    pub(crate) async fn assemble_messages(&self, session_id: &str, input: &str) -> Vec<Message> {
        let mut messages = vec![Message::system(SYSTEM_PROMPT)];
        messages.extend(self.memory.build_context(session_id, input).await);
        messages.push(Message::user(input));
        messages
    }

    /// Try the primary model, then each eligible fallback in order.
    /// Attempts are strictly sequential; speculative parallel calls to
    /// multiple backends would double-bill paid APIs.
    async fn generate_with_fallback(
        &self,
        primary: &ModelDescriptor,
        messages: Vec<Message>,
        force_offline: bool,
    ) -> (String, String) {
        if let Some(text) = self.attempt(primary, &messages).await {
            return (text, primary.name.clone());
        }

        for candidate in self.fallback_chain(&primary.name, force_offline).await {
            info!(model = %candidate.name, provider = %candidate.provider, "Trying fallback model");
            if let Some(text) = self.attempt(&candidate, &messages).await {
                return (text, candidate.name.clone());
            }
        }

        (UNAVAILABLE_RESPONSE.to_string(), "none".to_string())
    }

    /// One generation attempt. `None` means the provider was unknown,
    /// unavailable, or returned an error.
    async fn attempt(&self, model: &ModelDescriptor, messages: &[Message]) -> Option<String> {
        let provider = match self.providers.get(&model.provider) {
            Some(p) => p,
            None => {
                warn!(provider = %model.provider, "No adapter registered for provider");
                return None;
            }
        };

        if !provider.is_available().await {
            warn!(provider = %model.provider, "Provider unavailable, skipping");
            return None;
        }

        let mut request = GenerateRequest::new(&model.name, messages.to_vec());
        request.max_tokens = self.config.max_tokens;
        request.temperature = self.config.temperature;

        match provider.generate(request).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(model = %model.name, provider = %model.provider, error = %e, "Generation failed");
                None
            }
        }
    }

    /// All other registry models, offline-filtered when the constraint is
    /// active, restricted to available providers, sorted ascending by
    /// expected latency. The stable sort keeps registry order on ties.
    pub(crate) async fn fallback_chain(
        &self,
        exclude: &str,
        force_offline: bool,
    ) -> Vec<ModelDescriptor> {
        let mut availability: HashMap<&str, bool> = HashMap::new();
        for (name, provider) in &self.providers {
            availability.insert(name.as_str(), provider.is_available().await);
        }

        let mut chain: Vec<ModelDescriptor> = self
            .registry
            .models_except(exclude)
            .into_iter()
            .filter(|m| !force_offline || m.offline_capable)
            .filter(|m| availability.get(m.provider.as_str()).copied().unwrap_or(false))
            .cloned()
            .collect();
        chain.sort_by_key(|m| m.latency_ms);
        chain
    }
}

pub(crate) fn round_secs(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{failing, succeeding, unavailable, StubProvider};
    use parley_memory::InMemoryStore;
    use std::sync::Arc;

    fn model(name: &str, provider: &str, latency_ms: u64, quality: f64, offline: bool) -> ModelDescriptor {
        ModelDescriptor {
            name: name.into(),
            provider: provider.into(),
            latency_ms,
            quality_score: quality,
            offline_capable: offline,
        }
    }

    fn orchestrator(
        models: Vec<ModelDescriptor>,
        providers: Vec<(&str, Arc<StubProvider>)>,
    ) -> Orchestrator {
        let providers: HashMap<String, Arc<dyn Provider>> = providers
            .into_iter()
            .map(|(name, p)| (name.to_string(), p as Arc<dyn Provider>))
            .collect();
        Orchestrator::new(
            AppConfig::default(),
            ModelRegistry::new(models),
            providers,
            MemoryManager::new(20, Some(Arc::new(InMemoryStore::new()))),
        )
    }

    #[tokio::test]
    async fn primary_success_uses_selected_model() {
        let groq = succeeding("groq", "the answer");
        let orch = orchestrator(
            vec![model("fast", "groq", 300, 0.8, false)],
            vec![("groq", groq.clone())],
        );

        let outcome = orch.process_message("hi", "s", false).await;
        assert_eq!(outcome.response, "the answer");
        assert_eq!(outcome.model_used, "fast");
        assert_eq!(groq.calls(), 1);
    }

    #[tokio::test]
    async fn falls_back_to_fastest_available() {
        // Scenario: primary fails; remaining models sorted by latency,
        // the 350ms one wins over the 900ms one
        let groq = failing("groq");
        let openrouter = succeeding("openrouter", "recovered");
        let orch = orchestrator(
            vec![
                model("primary", "groq", 300, 0.8, false),
                model("slow", "openrouter", 900, 0.9, false),
                model("quick", "openrouter", 350, 0.7, false),
            ],
            vec![("groq", groq.clone()), ("openrouter", openrouter.clone())],
        );

        let outcome = orch.process_message("hi", "s", false).await;
        assert_eq!(outcome.response, "recovered");
        assert_eq!(outcome.model_used, "quick");
        assert_eq!(groq.calls(), 1);
        assert_eq!(openrouter.calls(), 1);
    }

    #[tokio::test]
    async fn unavailable_provider_is_skipped_without_calling() {
        let groq = unavailable("groq");
        let ollama = succeeding("ollama", "local answer");
        let orch = orchestrator(
            vec![
                model("cloud", "groq", 300, 0.8, false),
                model("local", "ollama", 3000, 0.65, true),
            ],
            vec![("groq", groq.clone()), ("ollama", ollama.clone())],
        );

        let outcome = orch.process_message("hi", "s", false).await;
        assert_eq!(outcome.response, "local answer");
        assert_eq!(outcome.model_used, "local");
        assert_eq!(groq.calls(), 0);
    }

    #[tokio::test]
    async fn every_candidate_tried_once_before_sentinel() {
        let groq = failing("groq");
        let openrouter = failing("openrouter");
        let orch = orchestrator(
            vec![
                model("primary", "groq", 300, 0.8, false),
                model("backup", "openrouter", 500, 0.9, false),
            ],
            vec![("groq", groq.clone()), ("openrouter", openrouter.clone())],
        );

        let outcome = orch.process_message("hi", "s", false).await;
        assert_eq!(outcome.response, UNAVAILABLE_RESPONSE);
        assert_eq!(outcome.model_used, "none");
        assert_eq!(groq.calls(), 1);
        assert_eq!(openrouter.calls(), 1);
    }

    #[tokio::test]
    async fn exhaustion_returns_sentinel_and_commits() {
        let groq = failing("groq");
        let orch = orchestrator(
            vec![model("only", "groq", 300, 0.8, false)],
            vec![("groq", groq.clone())],
        );

        let outcome = orch.process_message("hi", "s", false).await;
        assert_eq!(outcome.response, UNAVAILABLE_RESPONSE);
        assert_eq!(outcome.model_used, "none");

        // The sentinel turn is still a completed turn
        let records = orch.memory().search("unavailable", 5).await;
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn routing_dead_end_is_a_recorded_turn() {
        // No offline-capable models + force_offline → NoCandidates
        let groq = succeeding("groq", "never called");
        let orch = orchestrator(
            vec![model("cloud", "groq", 300, 0.8, false)],
            vec![("groq", groq.clone())],
        );

        let outcome = orch.process_message("hi", "s", true).await;
        assert_eq!(outcome.model_used, "none");
        assert!(outcome.response.contains("offline"));
        assert_eq!(groq.calls(), 0);

        let ctx = orch.memory().build_context("s", "zzz-no-recall").await;
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx[1].content, outcome.response);
    }

    #[tokio::test]
    async fn force_offline_restricts_fallback_chain() {
        // Primary offline model fails; the cloud model must not be tried
        let ollama = failing("ollama");
        let groq = succeeding("groq", "cloud answer");
        let orch = orchestrator(
            vec![
                model("local", "ollama", 3000, 0.65, true),
                model("cloud", "groq", 300, 0.99, false),
            ],
            vec![("ollama", ollama.clone()), ("groq", groq.clone())],
        );

        let outcome = orch.process_message("hi", "s", true).await;
        assert_eq!(outcome.response, UNAVAILABLE_RESPONSE);
        assert_eq!(groq.calls(), 0);
    }

    #[tokio::test]
    async fn fallback_chain_latency_order_is_stable() {
        let groq = succeeding("groq", "x");
        let orch = orchestrator(
            vec![
                model("excluded", "groq", 100, 0.9, false),
                model("a", "groq", 500, 0.5, false),
                model("b", "groq", 500, 0.9, false),
                model("c", "groq", 200, 0.7, false),
            ],
            vec![("groq", groq)],
        );

        let chain = orch.fallback_chain("excluded", false).await;
        let names: Vec<&str> = chain.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn second_turn_sees_first_turn_in_context() {
        let groq = succeeding("groq", "first answer");
        let orch = orchestrator(
            vec![model("fast", "groq", 300, 0.8, false)],
            vec![("groq", groq)],
        );

        orch.process_message("remember the blue box", "s", false)
            .await;

        let messages = orch.assemble_messages("s", "what color was the box").await;
        // system prompt + recall summary + 2 short-term turns + new user turn
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert!(messages
            .iter()
            .any(|m| m.content.contains("remember the blue box")));
        assert_eq!(
            messages.last().map(|m| m.content.as_str()),
            Some("what color was the box")
        );
    }

    #[tokio::test]
    async fn concurrent_sessions_do_not_interfere() {
        let groq = succeeding("groq", "ok");
        let orch = Arc::new(orchestrator(
            vec![model("fast", "groq", 300, 0.8, false)],
            vec![("groq", groq)],
        ));

        let mut handles = Vec::new();
        for i in 0..10 {
            let orch = Arc::clone(&orch);
            handles.push(tokio::spawn(async move {
                orch.process_message(&format!("message {i}"), &format!("session-{i}"), false)
                    .await
            }));
        }
        for handle in handles {
            let outcome = handle.await.unwrap();
            assert_eq!(outcome.response, "ok");
        }
    }

    #[test]
    fn response_time_rounds_to_milliseconds() {
        assert_eq!(round_secs(1.23456), 1.235);
        assert_eq!(round_secs(0.0004), 0.0);
    }
}
