//! The model registry — a static catalog of backend model descriptors.
//!
//! The registry is loaded once at startup and read-only afterwards. Order is
//! significant: selection tie-breaks resolve to the earliest-registered model.

use serde::{Deserialize, Serialize};

/// A catalog entry describing one backend model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model name, unique within the registry
    pub name: String,

    /// Which provider serves this model (e.g., "groq", "ollama")
    pub provider: String,

    /// Expected response latency in milliseconds
    pub latency_ms: u64,

    /// Quality score in [0, 1]
    pub quality_score: f64,

    /// Whether the model runs without external network access
    pub offline_capable: bool,
}

/// An immutable, order-preserving sequence of model descriptors.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
}

impl ModelRegistry {
    /// Build a registry from an explicit descriptor list, preserving order.
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    /// The built-in catalog: three hosted Groq models, three hosted
    /// OpenRouter models, three local Ollama models.
    pub fn builtin() -> Self {
        fn m(
            name: &str,
            provider: &str,
            latency_ms: u64,
            quality_score: f64,
            offline_capable: bool,
        ) -> ModelDescriptor {
            ModelDescriptor {
                name: name.into(),
                provider: provider.into(),
                latency_ms,
                quality_score,
                offline_capable,
            }
        }

        Self::new(vec![
            m("llama-3.1-8b-instant", "groq", 300, 0.80, false),
            m("mixtral-8x7b-32768", "groq", 600, 0.88, false),
            m("llama-3.3-70b-versatile", "groq", 800, 0.95, false),
            m("google/gemini-2.0-flash-exp:free", "openrouter", 400, 0.85, false),
            m("meta-llama/llama-3.3-70b-instruct:free", "openrouter", 500, 0.90, false),
            m("deepseek/deepseek-r1:free", "openrouter", 2000, 0.93, false),
            m("phi3:mini", "ollama", 3000, 0.65, true),
            m("mistral:7b", "ollama", 5000, 0.75, true),
            m("qwen2.5:3b", "ollama", 4000, 0.60, true),
        ])
    }

    /// All descriptors in registration order.
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// All descriptors except the one with the given name, in order.
    pub fn models_except(&self, name: &str) -> Vec<&ModelDescriptor> {
        self.models.iter().filter(|m| m.name != name).collect()
    }

    /// Look up a descriptor by model name.
    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_shape() {
        let registry = ModelRegistry::builtin();
        assert_eq!(registry.len(), 9);

        // Order preserved: fastest groq model registered first
        assert_eq!(registry.models()[0].name, "llama-3.1-8b-instant");
        assert_eq!(registry.models()[0].latency_ms, 300);

        // Only the ollama models are offline-capable
        let offline: Vec<_> = registry
            .models()
            .iter()
            .filter(|m| m.offline_capable)
            .collect();
        assert_eq!(offline.len(), 3);
        assert!(offline.iter().all(|m| m.provider == "ollama"));
    }

    #[test]
    fn models_except_filters_by_name() {
        let registry = ModelRegistry::builtin();
        let rest = registry.models_except("mixtral-8x7b-32768");
        assert_eq!(rest.len(), 8);
        assert!(rest.iter().all(|m| m.name != "mixtral-8x7b-32768"));
    }

    #[test]
    fn get_by_name() {
        let registry = ModelRegistry::builtin();
        assert!(registry.get("phi3:mini").is_some());
        assert!(registry.get("nonexistent").is_none());
    }
}
