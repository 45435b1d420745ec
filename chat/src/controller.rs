//! Controller — typed command handlers for the chat screen.
//!
//! SYSTEM CONTEXT
//! ==============
//! The controller owns every piece of client state: settings, saved history,
//! the current turn list and the current conversation id. A front end feeds
//! it user actions and applies the [`Effect`]s it returns; it never touches a
//! rendering surface itself, which keeps the whole flow testable natively.
//!
//! A send is exposed both as one call ([`Controller::send_message`]) and as
//! two halves ([`Controller::begin_send`] / [`Controller::finish_send`]) for
//! front ends that render between starting the request and receiving the
//! reply.

use std::sync::Arc;

use chrono::Utc;

use crate::backend::{BackendError, ChatBackend};
use crate::format::format_message;
use crate::history::HistoryStore;
use crate::message::{Conversation, Message, Sender, conversation_id};
use crate::params::{ModelParameters, Provider, display_name};
use crate::pipeline::{MessagePipeline, PendingTurn};
pub use crate::settings::Confirm;
use crate::settings::{SettingField, SettingsStore};
use crate::storage::{KeyValueStore, StorageError};

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;

pub const CLEAR_QUESTION: &str = "Are you sure you want to clear this conversation?";
pub const NOTHING_TO_SHARE: &str = "No conversation to share!";

/// Input length above which the counter turns amber.
pub const INPUT_WARN_CHARS: usize = 1500;
/// Input length above which the counter turns red.
pub const INPUT_OVER_CHARS: usize = 2000;

// =============================================================================
// EFFECTS
// =============================================================================

/// One instruction for the rendering surface.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Show the empty-state welcome screen instead of the transcript.
    ShowWelcome,
    /// Show the transcript instead of the welcome screen.
    ShowChat,
    /// Append a rendered turn; `html` is already escaped and formatted.
    RenderMessage { id: String, sender: Sender, html: String },
    /// Remove every rendered turn.
    ClearMessages,
    ShowTyping,
    HideTyping,
    ClearInput,
    /// A request is (or is no longer) in flight; disable sending meanwhile.
    Busy(bool),
    /// Controls should reflect these parameters.
    SettingsChanged(ModelParameters),
    /// Header model labels changed.
    ModelDisplay(ModelDisplay),
    /// Transient message for the user.
    Notice(String),
    /// Transcript text to hand to the platform share sheet or clipboard.
    Share(String),
}

/// Header labels for the active model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelDisplay {
    /// Catalog name, e.g. `GPT-3.5 Turbo`.
    pub name: String,
    /// First word of the name, e.g. `GPT-3.5`.
    pub short_name: String,
    /// `T: <temperature> | Max: <maxTokens>`.
    pub summary: String,
}

impl ModelDisplay {
    #[must_use]
    pub fn for_params(params: &ModelParameters) -> Self {
        let name = display_name(&params.model).to_owned();
        let short_name = name.split(' ').next().unwrap_or_default().to_owned();
        Self { name, short_name, summary: params.summary() }
    }
}

/// Colour band of the character counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputLevel {
    Normal,
    Warn,
    Over,
}

/// Derived state of the message input box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputStatus {
    pub chars: usize,
    pub level: InputLevel,
    pub send_enabled: bool,
}

// =============================================================================
// CONTROLLER
// =============================================================================

pub struct Controller {
    settings: SettingsStore,
    history: HistoryStore,
    pipeline: MessagePipeline,
    backend: Arc<dyn ChatBackend>,
    conversation_id: Option<String>,
}

impl Controller {
    /// A controller over `store` for persistence and `backend` for replies.
    /// Call [`Self::start`] before handling commands.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            settings: SettingsStore::new(store.clone()),
            history: HistoryStore::new(store),
            pipeline: MessagePipeline::new(),
            backend,
            conversation_id: None,
        }
    }

    /// Restore history and settings. A saved model the saved provider no
    /// longer offers is replaced by that provider's first model.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if either persisted blob cannot be read.
    pub fn start(&mut self) -> Result<Vec<Effect>, StorageError> {
        let saved = self.history.load()?.len();
        let params = self.settings.load()?.clone();
        tracing::info!(saved, provider = %params.provider, model = %params.model, "playground started");
        Ok(vec![Effect::SettingsChanged(params), self.display_effect(), Effect::ShowWelcome])
    }

    #[must_use]
    pub fn params(&self) -> &ModelParameters {
        self.settings.params()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.pipeline.messages()
    }

    #[must_use]
    pub fn history(&self) -> &[Conversation] {
        self.history.list()
    }

    #[must_use]
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        self.pipeline.is_awaiting()
    }

    // -------------------------------------------------------------------------
    // Sending
    // -------------------------------------------------------------------------

    /// Send `text` and wait for the reply. Blank text or a pending reply
    /// makes this a no-op with no effects.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the conversation cannot be persisted.
    pub async fn send_message(&mut self, text: &str) -> Result<Vec<Effect>, StorageError> {
        let Some((turn, mut effects)) = self.begin_send(text) else {
            return Ok(Vec::new());
        };
        let backend = Arc::clone(&self.backend);
        let result = backend.send(turn.message(), self.settings.params()).await;
        effects.extend(self.finish_send(turn, result)?);
        Ok(effects)
    }

    /// First half of a send: append the user turn and mark the pipeline busy.
    pub fn begin_send(&mut self, text: &str) -> Option<(PendingTurn, Vec<Effect>)> {
        let turn = self.pipeline.begin(text)?;
        let mut effects = Vec::new();
        if self.conversation_id.is_none() {
            let id = conversation_id(Utc::now());
            tracing::debug!(id = %id, "conversation started");
            self.conversation_id = Some(id);
            effects.push(Effect::ShowChat);
        }
        if let Some(user) = self.pipeline.messages().last() {
            effects.push(render(user));
        }
        effects.extend([Effect::ClearInput, Effect::Busy(true), Effect::ShowTyping]);
        Some((turn, effects))
    }

    /// Second half of a send: append the reply and persist the conversation.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the conversation cannot be persisted.
    pub fn finish_send(
        &mut self,
        turn: PendingTurn,
        result: Result<String, BackendError>,
    ) -> Result<Vec<Effect>, StorageError> {
        let reply = render(self.pipeline.complete(turn, result));
        self.save_conversation()?;
        Ok(vec![Effect::HideTyping, reply, Effect::Busy(false)])
    }

    fn save_conversation(&mut self) -> Result<(), StorageError> {
        let Some(id) = self.conversation_id.as_deref() else {
            return Ok(());
        };
        let Some(conversation) = Conversation::snapshot(id, self.pipeline.messages(), self.settings.params()) else {
            return Ok(());
        };
        self.history.save(conversation)
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    /// Apply one raw control value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the settings cannot be persisted.
    pub fn update_setting(&mut self, field: SettingField, value: &str) -> Result<Vec<Effect>, StorageError> {
        self.settings.update(field, value)?;
        Ok(self.settings_effects())
    }

    /// Switch provider, moving to its first model when the current model is
    /// not one it offers.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the settings cannot be persisted.
    pub fn switch_provider(&mut self, provider: Provider) -> Result<Vec<Effect>, StorageError> {
        self.settings.update(SettingField::Provider, provider.as_str())?;
        if self.settings.reconcile_model() {
            self.settings.save()?;
        }
        Ok(self.settings_effects())
    }

    /// Reset settings to defaults after confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the settings cannot be persisted.
    pub fn reset_settings(&mut self, confirm: &impl Confirm) -> Result<Vec<Effect>, StorageError> {
        if self.settings.reset(confirm)? { Ok(self.settings_effects()) } else { Ok(Vec::new()) }
    }

    /// Persist the current settings as they are.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the settings cannot be persisted.
    pub fn save_settings(&self) -> Result<(), StorageError> {
        self.settings.save()
    }

    /// Roll a new random seed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the settings cannot be persisted.
    pub fn randomize_seed(&mut self) -> Result<Vec<Effect>, StorageError> {
        self.settings.randomize_seed()?;
        Ok(self.settings_effects())
    }

    fn settings_effects(&self) -> Vec<Effect> {
        vec![Effect::SettingsChanged(self.settings.params().clone()), self.display_effect()]
    }

    fn display_effect(&self) -> Effect {
        Effect::ModelDisplay(self.model_display())
    }

    #[must_use]
    pub fn model_display(&self) -> ModelDisplay {
        ModelDisplay::for_params(self.settings.params())
    }

    // -------------------------------------------------------------------------
    // Conversation management
    // -------------------------------------------------------------------------

    /// Start over with an empty conversation. Saved history is untouched.
    pub fn new_chat(&mut self) -> Vec<Effect> {
        self.reset_conversation();
        vec![Effect::ClearMessages, Effect::ShowWelcome, Effect::ClearInput]
    }

    /// Like [`Self::new_chat`], behind a confirmation prompt.
    pub fn clear_conversation(&mut self, confirm: &impl Confirm) -> Vec<Effect> {
        if !confirm.confirm(CLEAR_QUESTION) {
            return Vec::new();
        }
        self.reset_conversation();
        vec![Effect::ClearMessages, Effect::ShowWelcome]
    }

    fn reset_conversation(&mut self) {
        self.pipeline.clear();
        self.conversation_id = None;
    }

    /// Plain-text transcript of the current conversation.
    #[must_use]
    pub fn share_text(&self) -> Effect {
        let messages = self.pipeline.messages();
        if messages.is_empty() {
            return Effect::Notice(NOTHING_TO_SHARE.to_owned());
        }
        let transcript = messages
            .iter()
            .map(|m| format!("{}: {}", m.sender.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n\n");
        Effect::Share(transcript)
    }

    /// Counter and send-button state for the current input text.
    #[must_use]
    pub fn input_status(&self, text: &str) -> InputStatus {
        let chars = text.chars().count();
        let level = if chars > INPUT_OVER_CHARS {
            InputLevel::Over
        } else if chars > INPUT_WARN_CHARS {
            InputLevel::Warn
        } else {
            InputLevel::Normal
        };
        InputStatus { chars, level, send_enabled: !text.trim().is_empty() && !self.pipeline.is_awaiting() }
    }
}

fn render(message: &Message) -> Effect {
    Effect::RenderMessage { id: message.id.clone(), sender: message.sender, html: format_message(&message.content) }
}
