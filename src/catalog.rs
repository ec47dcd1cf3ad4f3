//! Catalog loader - validates raw intent documents into a [`Catalog`]
//!
//! Validation fails fast: the first structural violation becomes the error.
//! Individual non-text patterns or responses are dropped with a warning rather
//! than failing the whole document.

use std::path::Path;
use std::sync::Arc;

use ahash::AHashSet;
use serde_json::Value;

use crate::error::{ChatbotError, Result};
use crate::service::{ErrorLogger, Metrics};
use crate::types::{Catalog, Intent};

const MISSING_DATA: &str = "Intent data is missing";
const MISSING_INTENTS: &str = "Invalid intent data structure: missing intents property";
const INTENTS_NOT_ARRAY: &str = "Invalid intent data structure: intents must be an array";
const EMPTY_DATA: &str = "Intent data is empty";
const MISSING_PROPERTIES: &str = "Invalid intent structure: missing required properties";
const FIELDS_NOT_ARRAYS: &str = "Invalid intent structure: patterns and responses must be arrays";

impl Catalog {
    /// Validate a raw catalog document of the shape `{ "intents": [...] }`
    pub fn from_value(raw: Option<&Value>) -> Result<Self> {
        let raw = match raw {
            Some(Value::Null) | None => return Err(load_error(MISSING_DATA)),
            Some(raw) => raw,
        };

        let entries = raw
            .get("intents")
            .ok_or_else(|| load_error(MISSING_INTENTS))?;
        let entries = entries
            .as_array()
            .ok_or_else(|| load_error(INTENTS_NOT_ARRAY))?;

        if entries.is_empty() {
            return Err(load_error(EMPTY_DATA));
        }

        let mut intents = Vec::with_capacity(entries.len());
        let mut labels = AHashSet::with_capacity(entries.len());

        for entry in entries {
            let intent = parse_intent(entry)?;
            if !labels.insert(intent.label.clone()) {
                tracing::warn!(intent = %intent.label, "Duplicate intent label");
            }
            intents.push(Arc::new(intent));
        }

        Ok(Self { intents })
    }

    /// Parse and validate a JSON catalog document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(json)
            .map_err(|e| ChatbotError::IntentLoad(format!("Failed to parse intent data: {e}")))?;
        Self::from_value(Some(&raw))
    }

    /// Read, parse and validate a JSON catalog file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ChatbotError::IntentLoad(format!(
                "Failed to read intent data from {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&json)
    }
}

fn load_error(message: &str) -> ChatbotError {
    ChatbotError::IntentLoad(message.to_string())
}

fn parse_intent(entry: &Value) -> Result<Intent> {
    let label = entry
        .get("tag")
        .and_then(Value::as_str)
        .filter(|tag| !tag.trim().is_empty())
        .ok_or_else(|| load_error(MISSING_PROPERTIES))?;

    let (patterns, responses) = match (present(entry, "patterns"), present(entry, "responses")) {
        (Some(patterns), Some(responses)) => (patterns, responses),
        _ => return Err(load_error(MISSING_PROPERTIES)),
    };

    let (patterns, responses) = match (patterns.as_array(), responses.as_array()) {
        (Some(patterns), Some(responses)) => (patterns, responses),
        _ => return Err(load_error(FIELDS_NOT_ARRAYS)),
    };

    let patterns: Vec<String> = text_entries(label, "pattern", patterns)
        .into_iter()
        .filter(|pattern| {
            let usable = !pattern.trim().is_empty();
            if !usable {
                tracing::warn!(intent = %label, "Skipping blank pattern");
            }
            usable
        })
        .collect();
    // Blank responses stay; they surface as a response generation error on match
    let responses = text_entries(label, "response", responses);
    if patterns.is_empty() || responses.is_empty() {
        return Err(load_error(MISSING_PROPERTIES));
    }

    let context = entry
        .get("context_set")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Intent {
        label: label.to_string(),
        patterns,
        responses,
        context,
    })
}

/// A required field, or `None` when it is absent or empty (`null`, `""`, `false`, `0`)
fn present<'v>(entry: &'v Value, field: &str) -> Option<&'v Value> {
    entry.get(field).filter(|value| match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64() != Some(0.0),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Keep the text entries of a pattern/response list, warning about the rest
fn text_entries(label: &str, field: &str, values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|value| match value.as_str() {
            Some(text) => Some(text.to_string()),
            None => {
                tracing::warn!(intent = %label, %field, %value, "Skipping non-text entry");
                None
            }
        })
        .collect()
}

/// Validates catalogs and reports failures to the injected collaborators
pub struct CatalogLoader<'a> {
    logger: &'a dyn ErrorLogger,
    metrics: Option<&'a dyn Metrics>,
}

impl<'a> CatalogLoader<'a> {
    pub fn new(logger: &'a dyn ErrorLogger, metrics: Option<&'a dyn Metrics>) -> Self {
        Self { logger, metrics }
    }

    pub fn load(&self, raw: Option<&Value>) -> Result<Catalog> {
        Catalog::from_value(raw).map_err(|err| {
            self.logger.log_error("Error loading intents", &err);
            if let Some(metrics) = self.metrics {
                metrics.record_error(err.kind(), &err.to_string());
            }
            err
        })
    }
}
