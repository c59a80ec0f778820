//! MemoryStore trait — the long-term semantic store contract.
//!
//! The long-term store keeps past exchanges and answers similarity queries.
//! The indexing/similarity engine behind it is an external concern consumed
//! through this narrow contract; the store is append-only from the gateway's
//! point of view (records are never mutated or deleted here).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// A single long-term memory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique ID for this record
    pub id: String,

    /// The stored text — one user turn and its paired assistant turn
    pub text: String,

    /// When this record was written
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Relevance score (set by search operations)
    #[serde(default)]
    pub score: f32,

    /// Provenance metadata
    #[serde(default)]
    pub metadata: RecordMetadata,
}

/// Provenance for a memory record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Which session produced this exchange
    #[serde(default)]
    pub session_id: String,
}

/// The long-term memory store contract.
///
/// Implementations: in-memory (testing/ephemeral), JSONL file (persistent).
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The store name (e.g., "in_memory", "file").
    fn name(&self) -> &str;

    /// Append a record; returns its generated ID.
    async fn store(
        &self,
        text: String,
        metadata: RecordMetadata,
    ) -> std::result::Result<String, MemoryError>;

    /// Return up to `k` records ranked by similarity to `query`.
    ///
    /// An empty store yields an empty list, never an error.
    async fn search(
        &self,
        query: &str,
        k: usize,
    ) -> std::result::Result<Vec<MemoryRecord>, MemoryError>;

    /// Total number of stored records.
    async fn count(&self) -> std::result::Result<usize, MemoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serialization() {
        let record = MemoryRecord {
            id: "rec_001".into(),
            text: "User: hi\nAssistant: hello".into(),
            created_at: Utc::now(),
            score: 0.9,
            metadata: RecordMetadata {
                session_id: "session-1".into(),
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("rec_001"));
        assert!(json.contains("session-1"));
    }

    #[test]
    fn metadata_defaults_to_empty_session() {
        let record: MemoryRecord =
            serde_json::from_str(r#"{"id":"1","text":"t"}"#).unwrap();
        assert!(record.metadata.session_id.is_empty());
        assert_eq!(record.score, 0.0);
    }
}
