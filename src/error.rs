//! Error taxonomy for catalog loading, resolution and response generation

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ChatbotError>;

/// Errors raised by the intent engine and its collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatbotError {
    /// The intent catalog is structurally invalid
    #[error("{0}")]
    IntentLoad(String),

    /// Resolution preconditions were violated
    #[error("{0}")]
    IntentMatch(String),

    /// A matched intent has no usable response
    #[error("{0}")]
    ResponseGeneration(String),

    /// The chat history collaborator failed
    #[error("{0}")]
    ChatHistory(String),

    /// Engine configuration could not be parsed or applied
    #[error("{0}")]
    InvalidConfig(String),
}

impl ChatbotError {
    /// Stable tag reported to the metrics collaborator
    pub fn kind(&self) -> &'static str {
        match self {
            ChatbotError::IntentLoad(_) => "INTENT_LOAD_ERROR",
            ChatbotError::IntentMatch(_) => "INTENT_MATCH_ERROR",
            ChatbotError::ResponseGeneration(_) => "RESPONSE_GENERATION_ERROR",
            ChatbotError::ChatHistory(_) => "CHAT_HISTORY_ERROR",
            ChatbotError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    /// Convert any error raised during resolution into an `IntentMatch` error.
    ///
    /// Errors that already belong to the resolution stage pass through untouched.
    pub fn into_match_error(self) -> Self {
        match self {
            err @ ChatbotError::IntentMatch(_) => err,
            other => ChatbotError::IntentMatch(format!("Error matching intent: {other}")),
        }
    }
}
