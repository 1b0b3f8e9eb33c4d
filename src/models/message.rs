//! Messages carried on the bus and the chat projection handed to capabilities

use super::record::StructuredRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Sender name for messages that come from the end user
pub const HUMAN_SENDER: &str = "human";

/// Payload of a message: raw text (brief, HTML) or a normalized record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Record(StructuredRecord),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&StructuredRecord> {
        match self {
            Content::Record(record) => Some(record),
            Content::Text(_) => None,
        }
    }

    /// Text handed to a capability: text verbatim, records as pretty JSON
    pub fn render(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Record(record) => serde_json::to_string_pretty(record)
                .unwrap_or_else(|_| format!("{:?}", record)),
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<StructuredRecord> for Content {
    fn from(record: StructuredRecord) -> Self {
        Content::Record(record)
    }
}

/// An entry on the message bus. Immutable once published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub topic: String,
    pub sender: String,
    pub content: Content,
    /// Log-wide publish order, shared across all topics
    pub sequence: u64,
    pub published_at: DateTime<Utc>,
}

impl Message {
    /// Canonical block used when replaying this message as chat history
    pub fn to_chat_block(&self) -> String {
        format!(
            "Topic: {}\nSender: {}\nContent:\n{}",
            self.topic,
            self.sender,
            self.content.render()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Human,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::Human => f.write_str("human"),
            ChatRole::Assistant => f.write_str("assistant"),
        }
    }
}

/// One prior exchange as seen by a capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl From<&Message> for ChatTurn {
    fn from(message: &Message) -> Self {
        let role = if message.sender == HUMAN_SENDER {
            ChatRole::Human
        } else {
            ChatRole::Assistant
        };
        Self {
            role,
            text: message.to_chat_block(),
        }
    }
}
