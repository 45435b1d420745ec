//! Message pipeline — the turn list and the single in-flight request.
//!
//! DESIGN
//! ======
//! One conversation cycles `Idle → AwaitingResponse → Idle`. A send is a
//! no-op while a response is pending or when the trimmed text is empty, so
//! at most one request is ever in flight. The flag is a plain state value,
//! not a lock: the pipeline is driven from one event loop.
//!
//! The send is split into [`MessagePipeline::begin`] and
//! [`MessagePipeline::complete`] so a front end can show a typing indicator
//! while the request runs; [`MessagePipeline::send`] does both around one
//! backend call. Failures become an assistant-authored error message and the
//! conversation carries on.

use crate::backend::{BackendError, ChatBackend};
use crate::message::Message;
use crate::params::ModelParameters;

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PipelineState {
    #[default]
    Idle,
    AwaitingResponse,
}

/// A user turn that has been appended and now awaits its reply.
#[derive(Debug)]
#[must_use = "a pending turn leaves the pipeline busy until completed"]
pub struct PendingTurn {
    message: String,
}

impl PendingTurn {
    /// The trimmed text to send to the backend.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Default)]
pub struct MessagePipeline {
    messages: Vec<Message>,
    state: PipelineState,
}

impl MessagePipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        self.state == PipelineState::AwaitingResponse
    }

    /// Append the user turn and enter `AwaitingResponse`.
    ///
    /// Returns `None`, changing nothing, when the text is blank or a reply is
    /// already pending.
    pub fn begin(&mut self, raw: &str) -> Option<PendingTurn> {
        let text = raw.trim();
        if text.is_empty() || self.is_awaiting() {
            return None;
        }
        self.messages.push(Message::user(text));
        self.state = PipelineState::AwaitingResponse;
        Some(PendingTurn { message: text.to_owned() })
    }

    /// Append the assistant turn for `result` and return to `Idle`.
    pub fn complete(&mut self, turn: PendingTurn, result: Result<String, BackendError>) -> &Message {
        let content = match result {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, chars = turn.message.chars().count(), "chat request failed");
                error_reply(&e)
            }
        };
        self.messages.push(Message::assistant(content));
        self.state = PipelineState::Idle;
        &self.messages[self.messages.len() - 1]
    }

    /// Run a full turn against `backend`. Returns the assistant message, or
    /// `None` if the send was a no-op.
    pub async fn send(
        &mut self,
        raw: &str,
        params: &ModelParameters,
        backend: &dyn ChatBackend,
    ) -> Option<&Message> {
        let turn = self.begin(raw)?;
        let result = backend.send(turn.message(), params).await;
        Some(self.complete(turn, result))
    }

    /// Drop all turns. A pending reply, if any, still lands when completed.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Assistant text shown in place of a reply when the backend fails.
#[must_use]
pub fn error_reply(err: &BackendError) -> String {
    format!("Sorry, I encountered an error: {err}. Please check your API keys and try again.")
}
