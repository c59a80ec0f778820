//! Wiring from configuration to concrete provider instances and the
//! model registry.

use std::collections::HashMap;
use std::sync::Arc;

use parley_config::AppConfig;
use parley_core::provider::Provider;
use parley_routing::{ModelDescriptor, ModelRegistry};

use crate::ollama::OllamaProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the model registry from configuration.
///
/// A non-empty `[[models]]` table replaces the built-in catalog wholesale,
/// preserving the configured order.
pub fn build_registry(config: &AppConfig) -> ModelRegistry {
    if config.models.is_empty() {
        return ModelRegistry::builtin();
    }

    ModelRegistry::new(
        config
            .models
            .iter()
            .map(|m| ModelDescriptor {
                name: m.name.clone(),
                provider: m.provider.clone(),
                latency_ms: m.latency_ms,
                quality_score: m.quality_score,
                offline_capable: m.offline_capable,
            })
            .collect(),
    )
}

/// Build the provider gateways from configuration.
///
/// The three known backends are always constructed; a missing credential
/// leaves the provider in place but permanently unavailable. Any additional
/// `[providers.<name>]` entry with an `api_url` becomes a generic
/// OpenAI-compatible adapter.
pub fn build_providers(config: &AppConfig) -> HashMap<String, Arc<dyn Provider>> {
    let mut providers: HashMap<String, Arc<dyn Provider>> = HashMap::new();

    providers.insert(
        "groq".into(),
        Arc::new(OpenAiCompatProvider::groq(
            config.provider_api_key("groq").unwrap_or_default(),
        )),
    );

    providers.insert(
        "openrouter".into(),
        Arc::new(OpenAiCompatProvider::openrouter(
            config.provider_api_key("openrouter").unwrap_or_default(),
        )),
    );

    providers.insert(
        "ollama".into(),
        Arc::new(OllamaProvider::new(config.provider_api_url("ollama"))),
    );

    for (name, provider_config) in &config.providers {
        if providers.contains_key(name) {
            continue;
        }
        let Some(api_url) = &provider_config.api_url else {
            continue;
        };
        providers.insert(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(
                name,
                api_url,
                provider_config.api_key.clone().unwrap_or_default(),
            )),
        );
    }

    providers
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_config::{ModelEntry, ProviderConfig};

    #[test]
    fn default_config_yields_builtin_registry() {
        let registry = build_registry(&AppConfig::default());
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn configured_models_replace_builtin_catalog() {
        let config = AppConfig {
            models: vec![ModelEntry {
                name: "custom-model".into(),
                provider: "groq".into(),
                latency_ms: 250,
                quality_score: 0.7,
                offline_capable: false,
            }],
            ..AppConfig::default()
        };
        let registry = build_registry(&config);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.models()[0].name, "custom-model");
    }

    #[test]
    fn known_backends_always_constructed() {
        let providers = build_providers(&AppConfig::default());
        assert!(providers.contains_key("groq"));
        assert!(providers.contains_key("openrouter"));
        assert!(providers.contains_key("ollama"));
    }

    #[test]
    fn extra_provider_with_url_becomes_generic_adapter() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "vllm".into(),
            ProviderConfig {
                api_key: None,
                api_url: Some("http://localhost:8000/v1".into()),
            },
        );
        let providers = build_providers(&config);
        assert!(providers.contains_key("vllm"));
    }

    #[test]
    fn extra_provider_without_url_is_skipped() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "mystery".into(),
            ProviderConfig {
                api_key: Some("key".into()),
                api_url: None,
            },
        );
        let providers = build_providers(&config);
        assert!(!providers.contains_key("mystery"));
    }
}
