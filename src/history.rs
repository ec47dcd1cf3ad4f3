//! Chat history collaborators
//!
//! Transcripts keep only the most recent messages; older ones are trimmed on
//! every append.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_HISTORY_ENTRIES;
use crate::error::{ChatbotError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One transcript entry as persisted by history collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            intent: None,
        }
    }

    pub fn bot(text: impl Into<String>, intent: Option<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
            intent,
        }
    }
}

/// Persistence collaborator for chat transcripts
pub trait ChatHistory: Send + Sync {
    fn append(&self, message: ChatMessage) -> Result<()>;
    /// Messages oldest first
    fn messages(&self) -> Result<Vec<ChatMessage>>;
    fn clear(&self) -> Result<()>;
}

fn trim_to(messages: &mut VecDeque<ChatMessage>, max_entries: usize) {
    while messages.len() > max_entries {
        messages.pop_front();
    }
}

/// Bounded in-process transcript
#[derive(Debug)]
pub struct InMemoryChatHistory {
    max_entries: usize,
    messages: Mutex<VecDeque<ChatMessage>>,
}

impl InMemoryChatHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            messages: Mutex::new(VecDeque::with_capacity(max_entries)),
        }
    }
}

impl Default for InMemoryChatHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_ENTRIES)
    }
}

impl ChatHistory for InMemoryChatHistory {
    fn append(&self, message: ChatMessage) -> Result<()> {
        let mut messages = self.messages.lock();
        messages.push_back(message);
        trim_to(&mut messages, self.max_entries);
        Ok(())
    }

    fn messages(&self) -> Result<Vec<ChatMessage>> {
        Ok(self.messages.lock().iter().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        self.messages.lock().clear();
        Ok(())
    }
}

/// Transcript stored as a JSON array in a single file
#[derive(Debug)]
pub struct JsonFileChatHistory {
    path: PathBuf,
    max_entries: usize,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl JsonFileChatHistory {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            max_entries,
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<VecDeque<ChatMessage>> {
        if !self.path.exists() {
            return Ok(VecDeque::new());
        }
        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| history_error("Failed to read chat history", e))?;
        if json.trim().is_empty() {
            return Ok(VecDeque::new());
        }
        serde_json::from_str(&json).map_err(|e| history_error("Failed to parse chat history", e))
    }

    fn write(&self, messages: &VecDeque<ChatMessage>) -> Result<()> {
        let json = serde_json::to_string_pretty(messages)
            .map_err(|e| history_error("Failed to serialize chat history", e))?;
        std::fs::write(&self.path, json).map_err(|e| history_error("Failed to save chat history", e))
    }
}

fn history_error(context: &str, err: impl std::fmt::Display) -> ChatbotError {
    ChatbotError::ChatHistory(format!("{context}: {err}"))
}

impl ChatHistory for JsonFileChatHistory {
    fn append(&self, message: ChatMessage) -> Result<()> {
        let _guard = self.lock.lock();
        let mut messages = self.read()?;
        messages.push_back(message);
        trim_to(&mut messages, self.max_entries);
        self.write(&messages)
    }

    fn messages(&self) -> Result<Vec<ChatMessage>> {
        let _guard = self.lock.lock();
        Ok(self.read()?.into())
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock();
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| history_error("Failed to clear chat history", e))?;
        }
        Ok(())
    }
}
