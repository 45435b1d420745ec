//! Key-value persistence for settings and history blobs.
//!
//! DESIGN
//! ======
//! Both stores read and write a whole JSON blob under a fixed key, the same
//! way the browser build uses `localStorage`. The trait keeps that contract
//! (string in, string out, no partial updates) so the stores behave the same
//! on every backend. Writes are synchronous; the last writer wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

/// Key holding the serialized [`crate::params::ModelParameters`].
pub const SETTINGS_KEY: &str = "llm_model_params";

/// Key holding the serialized list of saved conversations.
pub const HISTORY_KEY: &str = "llm_chat_history";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by storage backends and the stores built on them.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing storage cannot be reached (no window, private mode, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Writing the blob would exceed the backend's quota.
    #[error("storage quota exceeded writing {key} ({size} bytes)")]
    QuotaExceeded { key: String, size: usize },

    /// Filesystem failure in [`FileStore`].
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted blob is not valid JSON for the expected type.
    #[error("stored value under {key} could not be decoded: {reason}")]
    Decode { key: String, reason: String },

    /// A value could not be serialized for persistence.
    #[error("value could not be encoded: {0}")]
    Encode(String),
}

// =============================================================================
// TRAIT
// =============================================================================

/// Whole-blob string storage keyed by name.
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Decode the JSON blob under `key`, if any.
pub(crate) fn load_json<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::Decode { key: key.to_owned(), reason: e.to_string() })
}

/// Encode `value` as JSON and store it under `key`.
pub(crate) fn save_json<T: serde::Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Encode(e.to_string()))?;
    store.set(key, &raw)
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-process store. Optionally enforces a per-blob byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects any blob larger than `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self { entries: Mutex::new(HashMap::new()), quota: Some(bytes) }
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota {
            if value.len() > limit {
                return Err(StorageError::QuotaExceeded { key: key.to_owned(), size: value.len() });
            }
        }
        self.entries()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        tracing::debug!(key, bytes = value.len(), "blob written");
        Ok(())
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// Browser `localStorage`. Only meaningful inside a window context.
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStore;

#[cfg(feature = "hydrate")]
impl LocalStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| StorageError::Unavailable("localStorage not available".into()))
    }
}

// `web_sys::Storage` is fetched per call, so the unit struct holds no JS handles.
#[cfg(feature = "hydrate")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::QuotaExceeded { key: key.to_owned(), size: value.len() })
    }
}
