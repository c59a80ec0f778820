//! In-memory store — useful for testing and sessions without persistence.

use async_trait::async_trait;
use chrono::Utc;
use parley_core::error::MemoryError;
use parley_core::memory::{MemoryRecord, MemoryStore, RecordMetadata};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::relevance;

/// An append-only store backed by a Vec. Records are never mutated or
/// removed once written.
pub struct InMemoryStore {
    records: RwLock<Vec<MemoryRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn store(
        &self,
        text: String,
        metadata: RecordMetadata,
    ) -> Result<String, MemoryError> {
        let id = Uuid::new_v4().to_string();
        self.records.write().await.push(MemoryRecord {
            id: id.clone(),
            text,
            created_at: Utc::now(),
            score: 0.0,
            metadata,
        });
        Ok(id)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<MemoryRecord>, MemoryError> {
        let records = self.records.read().await;
        let query_lower = query.to_lowercase();

        let scored: Vec<MemoryRecord> = records
            .iter()
            .cloned()
            .map(|mut r| {
                r.score = relevance::score(&r.text, &query_lower);
                r
            })
            .collect();

        Ok(relevance::rank(scored, k))
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.records.read().await.len())
    }
}
