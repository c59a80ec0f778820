//! Memory manager — merges short-term and long-term memory into the
//! message list handed to a provider.

use std::sync::Arc;

use parley_core::memory::{MemoryRecord, MemoryStore, RecordMetadata};
use parley_core::message::Message;
use tracing::{debug, warn};

use crate::short_term::ShortTermMemory;

/// How many long-term records to recall per turn.
const RECALL_LIMIT: usize = 3;

/// Owns the short-term buffer and (optionally) a long-term store.
///
/// Without a long-term store the manager runs in degraded mode: recall
/// returns nothing and completed turns are only kept in the session buffer.
pub struct MemoryManager {
    short_term: ShortTermMemory,
    long_term: Option<Arc<dyn MemoryStore>>,
}

impl MemoryManager {
    pub fn new(short_term_limit: usize, long_term: Option<Arc<dyn MemoryStore>>) -> Self {
        Self {
            short_term: ShortTermMemory::new(short_term_limit),
            long_term,
        }
    }

    /// Build the conversation context for a new turn.
    ///
    /// Starts from the session's short-term messages. When the long-term
    /// store yields at least one hit for `query`, one synthetic system
    /// message enumerating the recalled records is prepended; otherwise the
    /// short-term messages are returned unmodified.
    pub async fn build_context(&self, session_id: &str, query: &str) -> Vec<Message> {
        let mut messages = Vec::new();

        let recalled = self.search(query, RECALL_LIMIT).await;
        if !recalled.is_empty() {
            debug!(count = recalled.len(), "Recalled long-term memories");
            let mut summary = String::from("Relevant past interactions:");
            for (i, record) in recalled.iter().enumerate() {
                summary.push_str(&format!("\n[Memory {}]: {}", i + 1, record.text));
            }
            messages.push(Message::system(summary));
        }

        messages.extend(self.short_term.context(session_id).await);
        messages
    }

    /// Record a completed turn. The only write path into long-term memory:
    /// partial streams must never reach this.
    pub async fn save_interaction(&self, session_id: &str, user_text: &str, assistant_text: &str) {
        self.short_term
            .add(session_id, Message::user(user_text))
            .await;
        self.short_term
            .add(session_id, Message::assistant(assistant_text))
            .await;

        if let Some(store) = &self.long_term {
            let text = format!("User: {user_text}\nAssistant: {assistant_text}");
            let metadata = RecordMetadata {
                session_id: session_id.to_string(),
            };
            if let Err(e) = store.store(text, metadata).await {
                warn!(error = %e, "Failed to persist interaction to long-term memory");
            }
        }
    }

    /// Query the long-term store. Degraded mode and store failures both
    /// yield an empty list.
    pub async fn search(&self, query: &str, k: usize) -> Vec<MemoryRecord> {
        let Some(store) = &self.long_term else {
            return Vec::new();
        };
        match store.search(query, k).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Long-term memory search failed");
                Vec::new()
            }
        }
    }

    /// Number of long-term records, or `None` in degraded mode.
    pub async fn long_term_count(&self) -> Option<usize> {
        let store = self.long_term.as_ref()?;
        match store.count().await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(error = %e, "Long-term memory count failed");
                None
            }
        }
    }

    pub async fn clear_session(&self, session_id: &str) {
        self.short_term.clear(session_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryStore;
    use parley_core::message::Role;

    fn with_store(limit: usize) -> MemoryManager {
        MemoryManager::new(limit, Some(Arc::new(InMemoryStore::new())))
    }

    #[tokio::test]
    async fn save_interaction_fills_both_tiers() {
        let mgr = with_store(20);
        mgr.save_interaction("s", "what is rust", "a systems language")
            .await;

        let ctx = mgr.build_context("s", "unrelated query").await;
        // No recall hit, so just the two short-term turns
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx[0].role, Role::User);
        assert_eq!(ctx[1].role, Role::Assistant);

        let records = mgr.search("rust", 5).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "User: what is rust\nAssistant: a systems language");
        assert_eq!(records[0].metadata.session_id, "s");
    }

    #[tokio::test]
    async fn build_context_prepends_recall_summary() {
        let mgr = with_store(20);
        mgr.save_interaction("old", "tell me about rust", "rust is fast")
            .await;

        let ctx = mgr.build_context("new", "more rust please").await;
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx[0].role, Role::System);
        assert!(ctx[0].content.starts_with("Relevant past interactions:"));
        assert!(ctx[0].content.contains("[Memory 1]: User: tell me about rust"));
    }

    #[tokio::test]
    async fn recall_summary_comes_before_short_term() {
        let mgr = with_store(20);
        mgr.save_interaction("s", "rust question", "rust answer").await;

        let ctx = mgr.build_context("s", "rust").await;
        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx[0].role, Role::System);
        assert_eq!(ctx[1].content, "rust question");
        assert_eq!(ctx[2].content, "rust answer");
    }

    #[tokio::test]
    async fn degraded_mode_still_serves_short_term() {
        let mgr = MemoryManager::new(20, None);
        mgr.save_interaction("s", "hello", "hi there").await;

        let ctx = mgr.build_context("s", "hello").await;
        assert_eq!(ctx.len(), 2);
        assert!(mgr.search("hello", 5).await.is_empty());
        assert!(mgr.long_term_count().await.is_none());
    }

    #[tokio::test]
    async fn recall_is_capped() {
        let mgr = with_store(20);
        for i in 0..5 {
            mgr.save_interaction("s", &format!("rust topic {i}"), "noted")
                .await;
        }

        let ctx = mgr.build_context("fresh", "rust").await;
        assert_eq!(ctx.len(), 1);
        let memory_lines = ctx[0].content.matches("[Memory ").count();
        assert_eq!(memory_lines, RECALL_LIMIT);
    }

    #[tokio::test]
    async fn clear_session_drops_buffer_not_store() {
        let mgr = with_store(20);
        mgr.save_interaction("s", "rust question", "answer").await;
        mgr.clear_session("s").await;

        let ctx = mgr.build_context("s", "unrelated").await;
        assert!(ctx.is_empty());
        assert_eq!(mgr.long_term_count().await, Some(1));
    }
}
