//! Short-term conversation memory with a sliding window.
//!
//! Stores recent history per session. Sessions are created lazily on first
//! reference and live for the process lifetime. System messages are pinned:
//! they survive every trim, even when they alone exceed the limit.

use std::collections::HashMap;

use parley_core::message::Message;
use tokio::sync::RwLock;

/// Bounded, per-session ordered turn buffer.
pub struct ShortTermMemory {
    limit: usize,
    sessions: RwLock<HashMap<String, Vec<Message>>>,
}

impl ShortTermMemory {
    /// Create a buffer keeping at most `limit` messages per session
    /// (clamped to at least 1).
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Append a message to the session history, then trim.
    ///
    /// The write lock covers both steps, so concurrent adds for the same
    /// session never lose or duplicate entries.
    pub async fn add(&self, session_id: &str, message: Message) {
        let mut sessions = self.sessions.write().await;
        let buf = sessions.entry(session_id.to_string()).or_default();
        buf.push(message);
        Self::trim(buf, self.limit);
    }

    /// All messages for the session, in chronological order.
    pub async fn context(&self, session_id: &str) -> Vec<Message> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop all messages for a session.
    pub async fn clear(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    /// Keep all pinned system messages plus the most recent
    /// `limit - pinned_count` non-system messages, chronological within
    /// each group.
    fn trim(buf: &mut Vec<Message>, limit: usize) {
        if buf.len() <= limit {
            return;
        }

        let pinned: Vec<Message> = buf.iter().filter(|m| m.is_system()).cloned().collect();
        let non_system: Vec<Message> = buf.iter().filter(|m| !m.is_system()).cloned().collect();

        let budget = limit.saturating_sub(pinned.len());
        let kept = if budget > 0 {
            non_system[non_system.len().saturating_sub(budget)..].to_vec()
        } else {
            Vec::new()
        };

        buf.clear();
        buf.extend(pinned);
        buf.extend(kept);
    }
}
