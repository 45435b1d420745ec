//! Settings store — the current [`ModelParameters`] and their persistence.
//!
//! DESIGN
//! ======
//! Every mutation persists the whole parameter object immediately; there is
//! no debouncing. Input arrives as raw control text, so `update` only
//! coerces types: unparsable numbers fall back to the field default and an
//! empty or unparsable seed clears it. No range validation happens here.
//!
//! Loading shallow-merges the saved object over the defaults so fields added
//! after the blob was written still get sensible values. A saved field whose
//! value no longer fits its type (a `null` number, a retired provider) keeps
//! the default instead. The model is then checked against the provider's
//! catalog, as old saves may hold retired model ids.

use std::sync::Arc;

use rand::Rng;
use serde_json::Value;

use crate::params::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P, ModelParameters, Provider, SEED_RANGE_END,
};
use crate::storage::{KeyValueStore, SETTINGS_KEY, StorageError, save_json};

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;

pub const RESET_QUESTION: &str = "Are you sure you want to reset all settings to default?";

/// Yes/no prompt shown before destructive actions.
pub trait Confirm {
    fn confirm(&self, question: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, question: &str) -> bool {
        self(question)
    }
}

/// Editable fields of [`ModelParameters`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingField {
    Provider,
    Model,
    Temperature,
    MaxTokens,
    TopP,
    Seed,
    SystemPrompt,
    ApiKey,
}

pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
    params: ModelParameters,
}

impl SettingsStore {
    /// A store holding default parameters. Call [`Self::load`] to restore.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, params: ModelParameters::default() }
    }

    #[must_use]
    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    /// Restore persisted parameters, merged over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails or the saved blob does
    /// not decode.
    pub fn load(&mut self) -> Result<&ModelParameters, StorageError> {
        let Some(raw) = self.store.get(SETTINGS_KEY)? else {
            tracing::debug!("no saved settings, using defaults");
            self.params = ModelParameters::default();
            return Ok(&self.params);
        };
        self.params = merge_over_defaults(&raw)?;
        self.reconcile_model();
        tracing::debug!(provider = %self.params.provider, model = %self.params.model, "settings restored");
        Ok(&self.params)
    }

    /// Persist the current parameters.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails.
    pub fn save(&self) -> Result<(), StorageError> {
        save_json(self.store.as_ref(), SETTINGS_KEY, &self.params)
    }

    /// Apply raw control input to one field and persist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails.
    pub fn update(&mut self, field: SettingField, value: &str) -> Result<(), StorageError> {
        let p = &mut self.params;
        match field {
            SettingField::Provider => {
                if let Some(provider) = Provider::parse(value.trim()) {
                    p.provider = provider;
                } else {
                    tracing::warn!(value, "ignoring unknown provider");
                }
            }
            SettingField::Model => p.model = value.to_owned(),
            SettingField::Temperature => p.temperature = coerce_float(value, DEFAULT_TEMPERATURE),
            SettingField::MaxTokens => p.max_tokens = coerce_int(value, DEFAULT_MAX_TOKENS),
            SettingField::TopP => p.top_p = coerce_float(value, DEFAULT_TOP_P),
            SettingField::Seed => p.seed = coerce_seed(value),
            SettingField::SystemPrompt => p.system_prompt = value.to_owned(),
            SettingField::ApiKey => p.api_key = value.to_owned(),
        }
        self.save()
    }

    /// Move to the provider's first catalog model when the current model is
    /// not one it offers. Returns whether the model changed. Not persisted.
    pub fn reconcile_model(&mut self) -> bool {
        let provider = self.params.provider;
        if provider.offers(&self.params.model) {
            return false;
        }
        let Some(first) = provider.models().first() else {
            return false;
        };
        tracing::info!(%provider, from = %self.params.model, to = first.value, "model not offered by provider");
        self.params.model = first.value.to_owned();
        true
    }

    /// Restore defaults after confirmation. Returns whether a reset happened.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails.
    pub fn reset(&mut self, confirm: &impl Confirm) -> Result<bool, StorageError> {
        if !confirm.confirm(RESET_QUESTION) {
            return Ok(false);
        }
        self.params = ModelParameters::default();
        self.reconcile_model();
        self.save()?;
        tracing::info!("settings reset to defaults");
        Ok(true)
    }

    /// Pick a random seed in `[0, 2147483647)` and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails.
    pub fn randomize_seed(&mut self) -> Result<i64, StorageError> {
        let seed = rand::rng().random_range(0..SEED_RANGE_END);
        self.params.seed = Some(seed);
        self.save()?;
        Ok(seed)
    }
}

fn merge_over_defaults(raw: &str) -> Result<ModelParameters, StorageError> {
    let decode = |e: serde_json::Error| StorageError::Decode { key: SETTINGS_KEY.to_owned(), reason: e.to_string() };

    let defaults = ModelParameters::default();
    let saved: Value = serde_json::from_str(raw).map_err(decode)?;
    let Value::Object(overrides) = saved else {
        tracing::warn!("saved settings are not an object, using defaults");
        return Ok(defaults);
    };
    let Value::Object(mut base) = serde_json::to_value(&defaults).map_err(|e| StorageError::Encode(e.to_string()))? else {
        return Ok(defaults);
    };

    for (key, value) in overrides {
        if !base.contains_key(&key) {
            continue;
        }
        let previous = base.insert(key.clone(), value);
        if serde_json::from_value::<ModelParameters>(Value::Object(base.clone())).is_err() {
            tracing::warn!(field = %key, "ignoring saved setting with invalid value");
            if let Some(previous) = previous {
                base.insert(key, previous);
            }
        }
    }
    serde_json::from_value(Value::Object(base)).map_err(decode)
}

fn coerce_float(raw: &str, default: f64) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coerce_int(raw: &str, default: u32) -> u32 {
    let raw = raw.trim();
    raw.parse::<u32>().ok().unwrap_or_else(|| {
        // "1000.0" from a range slider still means 1000.
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0 && *v <= f64::from(u32::MAX))
            .map_or(default, |v| v.trunc() as u32)
    })
}

fn coerce_seed(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}
