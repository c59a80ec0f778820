//! Configuration loading, validation, and management for parley.
//!
//! Loads configuration from `~/.parley/config.toml` with environment
//! variable overrides. Validates all settings at startup. A missing provider
//! credential is a warning, never a startup failure — the provider simply
//! reports itself unavailable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.parley/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default provider to prefer when wiring backends
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Sampling temperature for generation (0.0–2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per generated response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Preferred model per complexity tier (recognized, informational)
    #[serde(default = "default_model_preferences")]
    pub model_preferences: HashMap<String, String>,

    /// Memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Optional model catalog override. When non-empty, replaces the
    /// built-in registry wholesale, preserving this order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelEntry>,
}

fn default_provider() -> String {
    "groq".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_model_preferences() -> HashMap<String, String> {
    HashMap::from([
        ("trivial".into(), "llama-3.1-8b-instant".into()),
        ("simple".into(), "llama-3.1-8b-instant".into()),
        ("moderate".into(), "llama-3.3-70b-versatile".into()),
        ("complex".into(), "llama-3.3-70b-versatile".into()),
    ])
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("default_provider", &self.default_provider)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("model_preferences", &self.model_preferences)
            .field("memory", &self.memory)
            .field("providers", &self.providers)
            .field("models", &self.models)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Short-term buffer size per session (messages)
    #[serde(default = "default_short_term_limit")]
    pub short_term_limit: usize,

    /// Long-term store location (JSONL). None disables long-term memory.
    #[serde(default = "default_long_term_path")]
    pub long_term_path: Option<PathBuf>,
}

fn default_short_term_limit() -> usize {
    20
}
fn default_long_term_path() -> Option<PathBuf> {
    Some(
        AppConfig::config_dir()
            .join("memory")
            .join("interactions.jsonl"),
    )
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_limit: default_short_term_limit(),
            long_term_path: default_long_term_path(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// One model catalog entry in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub provider: String,
    #[serde(default = "default_entry_latency")]
    pub latency_ms: u64,
    #[serde(default = "default_entry_quality")]
    pub quality_score: f64,
    #[serde(default)]
    pub offline_capable: bool,
}

fn default_entry_latency() -> u64 {
    500
}
fn default_entry_quality() -> f64 {
    0.8
}

impl AppConfig {
    /// Load configuration from the default path (~/.parley/config.toml).
    ///
    /// Environment variable overrides (highest priority):
    /// - `GROQ_API_KEY`, `OPENROUTER_API_KEY` — provider credentials
    /// - `OLLAMA_BASE_URL` — local inference endpoint
    /// - `PARLEY_PROVIDER` — default provider
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.warn_missing_credentials();
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".parley")
    }

    /// Fold environment variables into the provider table.
    pub fn apply_env_overrides(&mut self) {
        for (name, var) in [("groq", "GROQ_API_KEY"), ("openrouter", "OPENROUTER_API_KEY")] {
            if let Ok(key) = std::env::var(var) {
                let entry = self.providers.entry(name.into()).or_default();
                if entry.api_key.is_none() {
                    entry.api_key = Some(key);
                }
            }
        }

        if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
            let entry = self.providers.entry("ollama".into()).or_default();
            if entry.api_url.is_none() {
                entry.api_url = Some(url);
            }
        }

        if let Ok(provider) = std::env::var("PARLEY_PROVIDER") {
            self.default_provider = provider;
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be a positive integer".into(),
            ));
        }

        if self.memory.short_term_limit == 0 {
            return Err(ConfigError::ValidationError(
                "memory.short_term_limit must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Warn about missing hosted-provider credentials.
    ///
    /// Non-fatal: the affected provider reports unavailable for the
    /// process lifetime instead of blocking startup.
    fn warn_missing_credentials(&self) {
        for (name, var) in [("groq", "GROQ_API_KEY"), ("openrouter", "OPENROUTER_API_KEY")] {
            let has_key = self
                .providers
                .get(name)
                .and_then(|p| p.api_key.as_ref())
                .is_some();
            if !has_key {
                tracing::warn!(
                    provider = name,
                    "{var} is not set; the {name} provider will be unavailable"
                );
            }
        }
    }

    /// The configured API key for a provider, if any.
    pub fn provider_api_key(&self, name: &str) -> Option<&str> {
        self.providers.get(name)?.api_key.as_deref()
    }

    /// The configured endpoint override for a provider, if any.
    pub fn provider_api_url(&self, name: &str) -> Option<&str> {
        self.providers.get(name)?.api_url.as_deref()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            model_preferences: default_model_preferences(),
            memory: MemoryConfig::default(),
            providers: HashMap::new(),
            models: Vec::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
