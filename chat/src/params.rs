//! Model parameters and the provider/model catalog.
//!
//! `ModelParameters` is the full configuration sent with every chat request
//! and persisted as camelCase JSON under [`crate::storage::SETTINGS_KEY`].

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "params_test.rs"]
mod tests;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TOP_P: f64 = 1.0;

/// Exclusive upper bound for generated seeds (`i32::MAX`).
pub const SEED_RANGE_END: i64 = 2_147_483_647;

// =============================================================================
// PROVIDER
// =============================================================================

/// Model vendor the backend routes a request to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Google,
}

impl Provider {
    pub const ALL: [Self; 2] = [Self::OpenAi, Self::Google];

    /// Wire name (`"openai"` / `"google"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Google => "google",
        }
    }

    /// Parse a wire name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "openai" => Some(Self::OpenAi),
            "google" => Some(Self::Google),
            _ => None,
        }
    }

    /// Models selectable for this provider, in menu order.
    #[must_use]
    pub fn models(self) -> &'static [ModelOption] {
        match self {
            Self::OpenAi => OPENAI_MODELS,
            Self::Google => GOOGLE_MODELS,
        }
    }

    /// Whether `model` is one of this provider's catalog entries.
    #[must_use]
    pub fn offers(self, model: &str) -> bool {
        self.models().iter().any(|m| m.value == model)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// One selectable model: wire value plus menu label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ModelOption {
    pub value: &'static str,
    pub text: &'static str,
}

const OPENAI_MODELS: &[ModelOption] = &[
    ModelOption { value: "gpt-4o", text: "GPT-4o" },
    ModelOption { value: "gpt-4o-mini", text: "GPT-4o Mini" },
    ModelOption { value: "gpt-4-turbo", text: "GPT-4 Turbo" },
    ModelOption { value: "gpt-4", text: "GPT-4" },
    ModelOption { value: "gpt-3.5-turbo", text: "GPT-3.5 Turbo" },
];

const GOOGLE_MODELS: &[ModelOption] = &[
    ModelOption { value: "gemini-2.5-flash", text: "Gemini 2.5 Flash" },
    ModelOption { value: "gemini-2.0-flash", text: "Gemini 2.0 Flash" },
    ModelOption { value: "gemini-flash-latest", text: "Gemini Flash Latest" },
    ModelOption { value: "gemini-pro-latest", text: "Gemini Pro Latest" },
];

/// Older model ids that may still sit in saved settings.
const LEGACY_NAMES: &[(&str, &str)] = &[
    ("gemini-1.5-pro", "Gemini 1.5 Pro"),
    ("gemini-1.5-flash", "Gemini 1.5 Flash"),
    ("gemini-pro", "Gemini Pro"),
    ("gemini-pro-vision", "Gemini Pro Vision"),
    ("local", "Local Model"),
];

/// Human-readable name for a model id. Unknown ids are shown verbatim.
#[must_use]
pub fn display_name(model: &str) -> &str {
    Provider::ALL
        .iter()
        .flat_map(|p| p.models().iter())
        .find(|m| m.value == model)
        .map(|m| m.text)
        .or_else(|| LEGACY_NAMES.iter().find(|(id, _)| *id == model).map(|(_, name)| *name))
        .unwrap_or(model)
}

// =============================================================================
// MODEL PARAMETERS
// =============================================================================

/// Generation settings chosen in the settings pane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParameters {
    pub provider: Provider,
    pub model: String,
    /// Sampling temperature, expected in `[0, 2]`.
    pub temperature: f64,
    pub max_tokens: u32,
    /// Nucleus sampling mass, expected in `[0, 1]`.
    pub top_p: f64,
    pub seed: Option<i64>,
    pub system_prompt: String,
    pub api_key: String,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            seed: None,
            system_prompt: String::new(),
            api_key: String::new(),
        }
    }
}

impl ModelParameters {
    /// Header summary, e.g. `T: 0.7 | Max: 1000`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("T: {} | Max: {}", self.temperature, self.max_tokens)
    }
}
