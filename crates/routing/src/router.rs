//! Model router — narrows the registry by constraints, then picks one model
//! for the classified complexity tier.
//!
//! `select` is a pure function: no side effects, callable with no network
//! state, and it never mutates the registry.

use std::collections::HashSet;

use parley_core::error::RoutingError;
use tracing::debug;

use crate::classifier::classify;
use crate::registry::{ModelDescriptor, ModelRegistry};

/// Constraints narrowing the candidate set before tier-based selection.
#[derive(Debug, Clone, Default)]
pub struct RouteConstraints {
    /// Only consider offline-capable models.
    pub force_offline: bool,

    /// If set, only consider models from these providers.
    pub allowed_providers: Option<HashSet<String>>,
}

impl RouteConstraints {
    pub fn offline() -> Self {
        Self {
            force_offline: true,
            allowed_providers: None,
        }
    }
}

/// Select the best model for the given input.
///
/// Pipeline, each stage failing closed:
/// 1. empty registry → `NoCandidates("registry")`
/// 2. provider filter (`NoCandidates("providers")` if it empties the set)
/// 3. offline filter (`NoCandidates("offline")` if it empties the set)
/// 4. classify the input
/// 5. trivial/simple → minimum latency; moderate/complex → maximum quality
///
/// Ties resolve to the earliest-registered candidate. The scan below keeps
/// the first extremum on purpose: `Iterator::min_by`/`max_by` return the
/// *last* one on ties, which would make selection depend on registry length.
pub fn select(
    registry: &ModelRegistry,
    input: &str,
    constraints: &RouteConstraints,
) -> Result<ModelDescriptor, RoutingError> {
    let mut candidates: Vec<&ModelDescriptor> = registry.models().iter().collect();
    if candidates.is_empty() {
        return Err(RoutingError::NoCandidates { stage: "registry" });
    }

    if let Some(allowed) = &constraints.allowed_providers {
        candidates.retain(|m| allowed.contains(&m.provider));
        if candidates.is_empty() {
            return Err(RoutingError::NoCandidates { stage: "providers" });
        }
    }

    if constraints.force_offline {
        candidates.retain(|m| m.offline_capable);
        if candidates.is_empty() {
            return Err(RoutingError::NoCandidates { stage: "offline" });
        }
    }

    let complexity = classify(input);

    let mut best = candidates[0];
    for m in &candidates[1..] {
        let better = if complexity.prefers_speed() {
            m.latency_ms < best.latency_ms
        } else {
            m.quality_score > best.quality_score
        };
        if better {
            best = m;
        }
    }

    debug!(
        complexity = ?complexity,
        model = %best.name,
        provider = %best.provider,
        "Selected model"
    );

    Ok(best.clone())
}
