pub mod chat;
pub mod init;
pub mod models;
pub mod status;

use std::sync::Arc;

use parley_config::AppConfig;
use parley_memory::{FileStore, MemoryManager};
use parley_orchestrator::Orchestrator;

/// Assemble the orchestrator from config: registry, provider adapters, and
/// the two-tier memory.
pub fn build_orchestrator(config: AppConfig) -> Arc<Orchestrator> {
    let registry = parley_providers::build_registry(&config);
    let providers = parley_providers::build_providers(&config);

    let long_term = config
        .memory
        .long_term_path
        .clone()
        .map(|path| Arc::new(FileStore::new(path)) as _);
    let memory = MemoryManager::new(config.memory.short_term_limit, long_term);

    Arc::new(Orchestrator::new(config, registry, providers, memory))
}
