//! File-based long-term store — persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `MemoryRecord`. Records are loaded into
//! memory on creation; new records are appended to the file as they are
//! stored. The store never rewrites or removes existing lines.
//!
//! Default location: `~/.parley/memory/interactions.jsonl`

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use parley_core::error::MemoryError;
use parley_core::memory::{MemoryRecord, MemoryStore, RecordMetadata};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::relevance;

/// An append-only JSONL store. Human-inspectable, no external services.
pub struct FileStore {
    path: PathBuf,
    records: RwLock<Vec<MemoryRecord>>,
}

impl FileStore {
    /// Open the store at the given path.
    ///
    /// An existing file is loaded; corrupted lines are skipped with a
    /// warning. A missing file means an empty store (created on first write).
    pub fn new(path: PathBuf) -> Self {
        let records = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = records.len(), "Long-term memory loaded");
        Self {
            path,
            records: RwLock::new(records),
        }
    }

    fn load_from_disk(path: &PathBuf) -> Vec<MemoryRecord> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<MemoryRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted memory record");
                    None
                }
            })
            .collect()
    }

    /// Append a single record to the file.
    fn append_to_disk(&self, record: &MemoryRecord) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemoryError::Storage(format!("Failed to create memory directory: {e}"))
            })?;
        }

        let line = serde_json::to_string(record)
            .map_err(|e| MemoryError::Storage(format!("Failed to serialize record: {e}")))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MemoryError::Storage(format!("Failed to open memory file: {e}")))?;
        writeln!(file, "{line}")
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl MemoryStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn store(
        &self,
        text: String,
        metadata: RecordMetadata,
    ) -> Result<String, MemoryError> {
        let record = MemoryRecord {
            id: Uuid::new_v4().to_string(),
            text,
            created_at: Utc::now(),
            score: 0.0,
            metadata,
        };
        let id = record.id.clone();

        // Hold the write lock across the disk append so concurrent stores
        // serialize and the file matches the in-memory order.
        let mut records = self.records.write().await;
        self.append_to_disk(&record)?;
        records.push(record);

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
