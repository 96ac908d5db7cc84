//! Durable preference storage.
//!
//! One JSON document under a fixed key holds `{preferences, timestamp,
//! version}`. Loading is tolerant: the preference payload deserializes as a
//! partial record, so unknown fields are ignored and missing fields fall back
//! to engine defaults.

use crate::prefs::{AccessibilityPreferences, PreferenceUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Envelope version for the persisted document.
pub const STORAGE_VERSION: &str = "1.0";

/// Fixed storage key; file backends use it as the file stem.
pub const STORAGE_KEY: &str = "accessibility-preferences";

/// The persisted envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPreferences {
    pub preferences: AccessibilityPreferences,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl StoredPreferences {
    pub fn now(preferences: AccessibilityPreferences) -> Self {
        Self {
            preferences,
            timestamp: Utc::now(),
            version: STORAGE_VERSION.to_string(),
        }
    }
}

/// Lenient counterpart used when reading back.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredDocument {
    preferences: Option<PreferenceUpdate>,
}

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Durable storage port for the preference store.
pub trait PreferenceStorage: Send + Sync {
    /// Load the stored preference payload, `None` when no entry exists.
    fn load(&self) -> Result<Option<PreferenceUpdate>, StorageError>;

    /// Write the current preferences under the fixed key.
    fn save(&self, preferences: &AccessibilityPreferences) -> Result<(), StorageError>;
}

/// Get the application data directory.
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "prefcast", "Prefcast")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// JSON file storage under the platform data directory.
pub struct FileStorage {
    path: PathBuf,
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStorage {
    pub fn new() -> Self {
        Self {
            path: data_dir().join(format!("{STORAGE_KEY}.json")),
        }
    }

    /// Storage at an explicit path.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStorage for FileStorage {
    fn load(&self) -> Result<Option<PreferenceUpdate>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|e| StorageError::Io(e.to_string()))?;

        let document: StoredDocument =
            serde_json::from_str(&content).map_err(|e| StorageError::Parse(e.to_string()))?;

        Ok(document.preferences)
    }

    fn save(&self, preferences: &AccessibilityPreferences) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }

        let document = StoredPreferences::now(preferences.clone());
        let content = serde_json::to_string_pretty(&document)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;

        std::fs::write(&self.path, content).map_err(|e| StorageError::Io(e.to_string()))
    }
}

/// In-process storage for headless use and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entry: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a raw JSON document.
    pub fn with_entry(json: impl Into<String>) -> Self {
        Self {
            entry: Mutex::new(Some(json.into())),
        }
    }

    /// The raw persisted document, if any.
    pub fn raw(&self) -> Option<String> {
        self.entry.lock().unwrap().clone()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PreferenceUpdate>, StorageError> {
        match self.entry.lock().unwrap().as_deref() {
            Some(content) => {
                let document: StoredDocument = serde_json::from_str(content)
                    .map_err(|e| StorageError::Parse(e.to_string()))?;
                Ok(document.preferences)
            }
            None => Ok(None),
        }
    }

    fn save(&self, preferences: &AccessibilityPreferences) -> Result<(), StorageError> {
        let document = StoredPreferences::now(preferences.clone());
        let content = serde_json::to_string_pretty(&document)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        *self.entry.lock().unwrap() = Some(content);
        Ok(())
    }
}
