//! Task classifier — maps raw input text to a complexity tier.
//!
//! Keyword-based heuristic over the lowercased, trimmed input. The keyword
//! sets are bilingual (English and Uzbek) and matching is case-insensitive
//! substring containment.

use serde::{Deserialize, Serialize};

/// The complexity tier of a user request. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskComplexity {
    Trivial,
    Simple,
    Moderate,
    Complex,
}

/// Keywords that indicate a complex task.
const COMPLEX_KEYWORDS: &[&str] = &[
    "explain",
    "analyze",
    "compare",
    "summarize",
    "write",
    "create",
    "generate",
    "design",
    "implement",
    "solve",
    "tushuntir",
    "tahlil",
    "solishtir",
    "yoz",
    "yaratish",
    "ishlab chiq",
    "qanday qilib",
    "nima uchun",
    "why",
    "how",
    "difference",
    "pros and cons",
];

/// Keywords that indicate a greeting / one-word answer.
const TRIVIAL_KEYWORDS: &[&str] = &[
    "hi",
    "hello",
    "salom",
    "assalomu alaykum",
    "hey",
    "thanks",
    "rahmat",
    "ok",
    "yes",
    "no",
    "ha",
    "yo'q",
    "bye",
    "xayr",
];

/// Classify a user input into a complexity tier.
///
/// Precedence is fixed: the trivial check wins over the complex check.
pub fn classify(input: &str) -> TaskComplexity {
    let text = input.trim().to_lowercase();
    let token_count = text.split_whitespace().count();

    let has_trivial = TRIVIAL_KEYWORDS.iter().any(|kw| text.contains(kw));

    // Trivial: very short greetings / one-word answers
    if token_count <= 3 && has_trivial {
        return TaskComplexity::Trivial;
    }

    if has_trivial {
        return TaskComplexity::Simple;
    }

    // Complex: contains complex keywords or is long
    if COMPLEX_KEYWORDS.iter().any(|kw| text.contains(kw)) || token_count > 20 {
        return TaskComplexity::Complex;
    }

    // Moderate: everything else of reasonable length
    if token_count > 8 {
        return TaskComplexity::Moderate;
    }

    TaskComplexity::Simple
}

impl TaskComplexity {
    /// Whether this tier prefers the fastest model over the best one.
    pub fn prefers_speed(self) -> bool {
        matches!(self, Self::Trivial | Self::Simple)
    }
}
