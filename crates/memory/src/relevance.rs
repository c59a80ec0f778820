//! Keyword relevance scoring shared by the store backends.

use parley_core::memory::MemoryRecord;

/// Score a record against the query: occurrence count normalized by text
/// length, so short records aren't drowned out by long ones.
pub(crate) fn score(text: &str, query_lower: &str) -> f32 {
    if query_lower.is_empty() {
        return 0.0;
    }
    let occurrences = text.to_lowercase().matches(query_lower).count();
    occurrences as f32 / (text.len() as f32 / 100.0).max(1.0)
}

/// Rank `records` by descending score and keep the top `k`.
pub(crate) fn rank(mut records: Vec<MemoryRecord>, k: usize) -> Vec<MemoryRecord> {
    records.retain(|r| r.score > 0.0);
    records.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    records.truncate(k);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::memory::RecordMetadata;

    fn record(text: &str, s: f32) -> MemoryRecord {
        MemoryRecord {
            id: String::new(),
            text: text.into(),
            created_at: chrono::Utc::now(),
            score: s,
            metadata: RecordMetadata::default(),
        }
    }

    #[test]
    fn score_counts_occurrences() {
        assert!(score("rust rust rust", "rust") > score("rust only once here", "rust"));
    }

    #[test]
    fn score_is_case_insensitive() {
        assert!(score("Rust and RUST", "rust") > 0.0);
    }

    #[test]
    fn no_match_scores_zero() {
        assert_eq!(score("nothing relevant", "quantum"), 0.0);
        assert_eq!(score("anything", ""), 0.0);
    }

    #[test]
    fn rank_orders_by_score_and_truncates() {
        let ranked = rank(
            vec![record("a", 0.1), record("b", 0.9), record("c", 0.5)],
            2,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].text, "b");
        assert_eq!(ranked[1].text, "c");
    }

    #[test]
    fn rank_drops_zero_scores() {
        let ranked = rank(vec![record("a", 0.0), record("b", 0.2)], 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].text, "b");
    }
}
