//! History store — saved conversations, most recent first, capped at 50.
//!
//! DESIGN
//! ======
//! The list is read-modify-written as one blob. Saving an id that already
//! exists replaces that entry where it sits; a new id is prepended. After
//! either, the list is truncated to [`HISTORY_CAP`] so the oldest entries
//! fall off the end. There is no delete, search or paging.

use std::sync::Arc;

use crate::message::Conversation;
use crate::storage::{HISTORY_KEY, KeyValueStore, StorageError, load_json, save_json};

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

/// Maximum number of conversations kept.
pub const HISTORY_CAP: usize = 50;

pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    conversations: Vec<Conversation>,
}

impl HistoryStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, conversations: Vec::new() }
    }

    /// Conversations as of the last load or save.
    #[must_use]
    pub fn list(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Read the persisted list, or an empty one if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails or the blob does not decode.
    pub fn load(&mut self) -> Result<&[Conversation], StorageError> {
        self.conversations = load_json(self.store.as_ref(), HISTORY_KEY)?.unwrap_or_default();
        Ok(&self.conversations)
    }

    /// Insert or replace `conversation` and persist the whole list.
    ///
    /// The persisted list is re-read first so a save never drops entries
    /// written since the last load.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if reading or writing the blob fails.
    pub fn save(&mut self, conversation: Conversation) -> Result<(), StorageError> {
        let mut history: Vec<Conversation> = load_json(self.store.as_ref(), HISTORY_KEY)?.unwrap_or_default();

        if let Some(existing) = history.iter_mut().find(|c| c.id == conversation.id) {
            *existing = conversation;
        } else {
            history.insert(0, conversation);
        }
        history.truncate(HISTORY_CAP);

        save_json(self.store.as_ref(), HISTORY_KEY, &history)?;
        tracing::debug!(count = history.len(), "chat history saved");
        self.conversations = history;
        Ok(())
    }
}
