//! Intent resolver - picks the best-scoring intent for a query

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ChatbotError, Result};
use crate::scorer::{normalize, PatternScorer};
use crate::types::{Catalog, MatchResult, Query};

/// Minimum aggregate score for an intent to count as matched (inclusive)
pub const ACCEPTANCE_THRESHOLD: f64 = 0.25;

/// Whether a best score clears the acceptance threshold
pub fn meets_threshold(score: f64) -> bool {
    score >= ACCEPTANCE_THRESHOLD
}

/// Resolve a query against a catalog
///
/// Blank queries resolve to no match. Non-text queries and a missing or empty
/// catalog are precondition failures. The first intent with the highest score
/// wins ties.
pub fn resolve(
    query: Query<'_>,
    catalog: Option<&Catalog>,
    scorer: &PatternScorer,
) -> Result<MatchResult> {
    let text = match query {
        Query::NonText(_) => {
            return Err(ChatbotError::IntentMatch("Query must be a string".to_string()))
        }
        Query::Absent => return Ok(MatchResult::none()),
        Query::Text(text) => text,
    };

    let normalized = normalize(text);
    if normalized.is_empty() {
        return Ok(MatchResult::none());
    }

    let catalog = match catalog {
        Some(catalog) if !catalog.is_empty() => catalog,
        _ => {
            return Err(ChatbotError::IntentMatch(
                "No intents available for matching".to_string(),
            ))
        }
    };

    let mut best = MatchResult::none();
    for intent in catalog.intents() {
        let Some(score) = scorer.score_intent(&normalized, intent) else {
            continue;
        };
        if best.intent.is_none() || score.total > best.score {
            best = MatchResult {
                intent: Some(Arc::clone(intent)),
                score: score.total,
                breakdown: Some(score),
            };
        }
    }

    tracing::debug!(
        query = %normalized,
        best = ?best.label(),
        score = best.score,
        "Best intent match"
    );

    if meets_threshold(best.score) {
        Ok(best)
    } else {
        Ok(MatchResult {
            intent: None,
            ..best
        })
    }
}

/// Holds the installed catalog and resolves queries against it
///
/// The catalog is swapped as a whole; a resolution in flight keeps the
/// snapshot it started with.
#[derive(Debug)]
pub struct IntentResolver {
    catalog: RwLock<Option<Arc<Catalog>>>,
    scorer: PatternScorer,
}

impl IntentResolver {
    pub fn new(scorer: PatternScorer) -> Self {
        Self {
            catalog: RwLock::new(None),
            scorer,
        }
    }

    /// Replace the backing catalog
    pub fn install(&self, catalog: Catalog) {
        let count = catalog.len();
        *self.catalog.write() = Some(Arc::new(catalog));
        tracing::info!(intents = count, "Installed intent catalog");
    }

    /// Current catalog snapshot
    pub fn snapshot(&self) -> Option<Arc<Catalog>> {
        self.catalog.read().clone()
    }

    pub fn resolve(&self, query: Query<'_>) -> Result<MatchResult> {
        let catalog = self.snapshot();
        resolve(query, catalog.as_deref(), &self.scorer)
    }
}
