//! Core data types for catalogs, queries and results

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scorer::PatternScore;

/// A labeled cluster of example phrasings mapped to candidate replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "tag")]
    pub label: String,
    pub patterns: Vec<String>,
    pub responses: Vec<String>,
    #[serde(rename = "context_set", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Intent {
    pub fn new(label: impl Into<String>, patterns: Vec<String>, responses: Vec<String>) -> Self {
        Self {
            label: label.into(),
            patterns,
            responses,
            context: None,
        }
    }

    /// Responses usable as replies (non-blank)
    pub fn valid_responses(&self) -> Vec<&str> {
        self.responses
            .iter()
            .map(String::as_str)
            .filter(|r| !r.trim().is_empty())
            .collect()
    }
}

/// Validated, read-only collection of intents
///
/// Built by [`Catalog::from_value`](crate::catalog) and never mutated afterwards;
/// intents are shared with match results through `Arc`.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub(crate) intents: Vec<Arc<Intent>>,
}

impl Catalog {
    pub fn intents(&self) -> &[Arc<Intent>] {
        &self.intents
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

/// Outcome of resolving one query against a catalog
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub intent: Option<Arc<Intent>>,
    pub score: f64,
    /// Breakdown of the best pattern of the winning intent
    pub breakdown: Option<PatternScore>,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            intent: None,
            score: 0.0,
            breakdown: None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.intent.as_deref().map(|intent| intent.label.as_str())
    }
}

/// Error tag carried by a [`ResponseResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    EmptyQuery,
    NoMatch,
    InternalError,
    IntentMatchError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EmptyQuery => "EMPTY_QUERY",
            ErrorKind::NoMatch => "NO_MATCH",
            ErrorKind::InternalError => "INTERNAL_ERROR",
            ErrorKind::IntentMatchError => "INTENT_MATCH_ERROR",
        }
    }
}

/// The value returned to front ends: `{ answer, intent, error }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseResult {
    pub answer: String,
    pub intent: Option<String>,
    pub error: Option<ErrorKind>,
}

impl ResponseResult {
    pub fn answered(answer: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            intent: Some(label.into()),
            error: None,
        }
    }

    pub fn failed(answer: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            answer: answer.into(),
            intent: None,
            error: Some(kind),
        }
    }
}

/// A query as received at the engine boundary
///
/// Front ends may hand over nothing, text, or some other value entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    Absent,
    Text(&'a str),
    /// A value that is not text; carries the received type name
    NonText(&'a str),
}

impl<'a> Query<'a> {
    /// Whether the query carries no usable text
    pub fn is_blank(&self) -> bool {
        match self {
            Query::Absent => true,
            Query::Text(text) => text.trim().is_empty(),
            Query::NonText(_) => false,
        }
    }
}

impl<'a> From<&'a str> for Query<'a> {
    fn from(text: &'a str) -> Self {
        Query::Text(text)
    }
}

impl<'a> From<&'a String> for Query<'a> {
    fn from(text: &'a String) -> Self {
        Query::Text(text.as_str())
    }
}

impl<'a> From<Option<&'a str>> for Query<'a> {
    fn from(text: Option<&'a str>) -> Self {
        text.map_or(Query::Absent, Query::Text)
    }
}

impl<'a> From<&'a Value> for Query<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Query::Absent,
            Value::String(text) => Query::Text(text.as_str()),
            Value::Bool(_) => Query::NonText("boolean"),
            Value::Number(_) => Query::NonText("number"),
            Value::Array(_) => Query::NonText("array"),
            Value::Object(_) => Query::NonText("object"),
        }
    }
}
