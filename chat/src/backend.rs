//! Backend client — one `POST /api/chat` round trip per user turn.
//!
//! ERROR HANDLING
//! ==============
//! A non-2xx status fails with the body's `error` text, or a generic
//! `HTTP error! status: <code>` when the body carries none. A 2xx body
//! without a string `response` field is a malformed response. Nothing is
//! retried and no timeout is applied; the caller awaits the single exchange.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::{ModelParameters, Provider};

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

/// Path of the chat completion endpoint, relative to the site root.
pub const CHAT_ENDPOINT: &str = "/api/chat";

// =============================================================================
// ERROR
// =============================================================================

/// Failures of a backend exchange. Display text is what the user sees.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A success response whose body is not the expected JSON shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// JSON body of `POST /api/chat`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub provider: Provider,
    pub model: String,
    pub message: String,
    pub system_prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub seed: Option<i64>,
}

impl ChatRequest {
    #[must_use]
    pub fn new(message: &str, params: &ModelParameters) -> Self {
        Self {
            provider: params.provider,
            model: params.model.clone(),
            message: message.to_owned(),
            system_prompt: params.system_prompt.clone(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            seed: params.seed,
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Anything that can turn one user message into one assistant reply.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait ChatBackend {
    /// Send `message` with `params` and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport failure, non-success status or a
    /// malformed body.
    async fn send(&self, message: &str, params: &ModelParameters) -> Result<String, BackendError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// `reqwest`-backed client for a playground backend at `base_url`.
pub struct HttpBackend {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    /// Client posting to `<base_url>/api/chat`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: chat_endpoint(base_url) })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl ChatBackend for HttpBackend {
    async fn send(&self, message: &str, params: &ModelParameters) -> Result<String, BackendError> {
        let body = ChatRequest::new(message, params);
        tracing::debug!(provider = %body.provider, model = %body.model, endpoint = %self.endpoint, "sending chat request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        tracing::debug!(status, bytes = text.len(), "chat response received");
        interpret_response(status, &text)
    }
}

fn chat_endpoint(base_url: &str) -> String {
    format!("{}{CHAT_ENDPOINT}", base_url.trim_end_matches('/'))
}

/// Map a status code and raw body to the reply text or a [`BackendError`].
pub(crate) fn interpret_response(status: u16, body: &str) -> Result<String, BackendError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map_or_else(|| format!("HTTP error! status: {status}"), str::to_owned);
        return Err(BackendError::Status { status, message });
    }

    let Some(root) = parsed else {
        return Err(BackendError::MalformedResponse("body is not JSON".into()));
    };
    root.get("response")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| BackendError::MalformedResponse("missing string field `response`".into()))
}
