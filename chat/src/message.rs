//! Chat turns and saved conversations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::params::ModelParameters;

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

/// Characters of the first message kept in a conversation title.
pub const TITLE_CHARS: usize = 50;

/// Author of a chat turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Transcript label, e.g. `USER`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Assistant => "ASSISTANT",
        }
    }
}

/// One immutable chat turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub id: String,
}

impl Message {
    #[must_use]
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self { sender, content: content.into(), timestamp: Utc::now(), id: uuid::Uuid::new_v4().to_string() }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content)
    }
}

/// A saved conversation as stored in history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    /// Time of the most recent save.
    pub timestamp: DateTime<Utc>,
    /// Settings in effect when the conversation was saved.
    pub model_params: ModelParameters,
}

impl Conversation {
    /// Snapshot the current turn list into a storable conversation.
    ///
    /// Returns `None` for an empty turn list; there is nothing to title.
    #[must_use]
    pub fn snapshot(id: &str, messages: &[Message], params: &ModelParameters) -> Option<Self> {
        let first = messages.first()?;
        Some(Self {
            id: id.to_owned(),
            title: title_for(&first.content),
            messages: messages.to_vec(),
            timestamp: Utc::now(),
            model_params: params.clone(),
        })
    }
}

/// Conversation id for a conversation started at `at` (epoch milliseconds).
///
/// Two conversations started in the same millisecond share an id.
#[must_use]
pub fn conversation_id(at: DateTime<Utc>) -> String {
    at.timestamp_millis().to_string()
}

/// Title derived from the first message: its first 50 characters plus `...`.
#[must_use]
pub fn title_for(first_message: &str) -> String {
    let head: String = first_message.chars().take(TITLE_CHARS).collect();
    format!("{head}...")
}
