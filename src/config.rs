//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{ChatbotError, Result};

/// Default number of chat messages kept by history collaborators
pub const DEFAULT_MAX_HISTORY_ENTRIES: usize = 50;

const DEFAULT_DOMAIN_KEYWORDS: &[&str] = &[
    "cut", "burn", "fever", "headache", "wound", "bleed", "pain", "sprain", "fracture", "bite",
    "sting", "rash", "allergy", "poison", "cough", "injury",
];

/// Reply texts, domain vocabulary and history bounds.
///
/// Scoring weights and thresholds are fixed constants and deliberately absent here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatbotConfig {
    pub empty_query_reply: String,
    pub no_match_reply: String,
    pub internal_error_reply: String,
    /// Words that earn the word-order bonus when found inside a matched word
    pub domain_keywords: Vec<String>,
    pub max_history_entries: usize,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            empty_query_reply: "I'm sorry, I didn't catch that. Could you please ask a question?"
                .to_string(),
            no_match_reply: "I'm sorry, I don't understand your question. Could you rephrase it \
                             or ask about a specific first aid topic?"
                .to_string(),
            internal_error_reply: "I'm sorry, something went wrong while processing your \
                                   question. Please try again."
                .to_string(),
            domain_keywords: DEFAULT_DOMAIN_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            max_history_entries: DEFAULT_MAX_HISTORY_ENTRIES,
        }
    }
}

impl ChatbotConfig {
    /// Parse a JSON configuration document; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ChatbotError::InvalidConfig(format!("Failed to parse config: {e}")))
    }
}
