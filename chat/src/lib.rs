//! Client core for the LLM playground chat UI.
//!
//! This crate owns everything the browser front end does that is not DOM
//! glue: model settings, saved conversation history, the send pipeline, the
//! `/api/chat` client and message formatting. The [`controller::Controller`]
//! ties them together behind typed command handlers that return
//! [`controller::Effect`]s, so the whole flow runs and tests without a
//! browser.
//!
//! Storage is pluggable through [`storage::KeyValueStore`]; with the
//! `hydrate` feature a `localStorage` backend is available for WASM builds.

pub mod backend;
pub mod controller;
pub mod format;
pub mod history;
pub mod message;
pub mod params;
pub mod pipeline;
pub mod settings;
pub mod storage;

pub use backend::{BackendError, ChatBackend, ChatRequest, HttpBackend};
pub use controller::{Confirm, Controller, Effect};
pub use history::HistoryStore;
pub use message::{Conversation, Message, Sender};
pub use params::{ModelOption, ModelParameters, Provider};
pub use pipeline::{MessagePipeline, PipelineState};
pub use settings::{SettingField, SettingsStore};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
