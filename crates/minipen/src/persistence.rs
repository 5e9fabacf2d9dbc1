//! Single-slot snapshot persistence.
//!
//! One JSON object `{html, css, js, timestamp}` lives under a fixed key of an
//! origin-scoped key-value store. Saving overwrites it; there is no history.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::composer::SourceDocument;

/// Storage key used by the playground unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "miniCodeEditor_savedCode";

/// Durable string store scoped to one origin (browser localStorage, a
/// directory on disk, or memory in tests). A single `set` must be atomic.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store exists but the operation failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The platform has no usable store (e.g. storage disabled by the browser).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// In-memory store, used by tests and headless sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    fail_next_set: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one raw value, e.g. foreign or corrupted data.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_owned(), value.to_owned());
        storage
    }

    /// Makes the next `set` fail with `reason` (a full quota, say) and
    /// leave the stored value untouched.
    pub fn fail_next_set(&mut self, reason: impl Into<String>) {
        self.fail_next_set = Some(reason.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(reason) = self.fail_next_set.take() {
            return Err(StorageError::Unavailable(reason));
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// The persisted copy of the panes plus its capture time (ISO-8601).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedSnapshot {
    pub html: String,
    pub css: String,
    pub js: String,
    pub timestamp: String,
}

impl SavedSnapshot {
    pub fn capture(source: &SourceDocument, captured_at: DateTime<Utc>) -> Self {
        Self {
            html: source.html.clone(),
            css: source.css.clone(),
            js: source.js.clone(),
            timestamp: iso_timestamp(captured_at),
        }
    }

    pub fn source(&self) -> SourceDocument {
        SourceDocument::new(self.html.clone(), self.css.clone(), self.js.clone())
    }

    pub fn into_source(self) -> SourceDocument {
        SourceDocument::new(self.html, self.css, self.js)
    }
}

/// Wire shape of a stored snapshot. Missing or `null` fields are tolerated and
/// become empty strings.
#[derive(Deserialize)]
struct StoredSnapshot {
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    css: Option<String>,
    #[serde(default)]
    js: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

impl From<StoredSnapshot> for SavedSnapshot {
    fn from(stored: StoredSnapshot) -> Self {
        Self {
            html: stored.html.unwrap_or_default(),
            css: stored.css.unwrap_or_default(),
            js: stored.js.unwrap_or_default(),
            timestamp: stored.timestamp.unwrap_or_default(),
        }
    }
}

/// RFC 3339 UTC with milliseconds and a `Z` suffix, the same text browsers
/// produce for `Date.prototype.toISOString`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing has been saved under the key. Informational, not an error.
    NothingSaved,
    Loaded(SavedSnapshot),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The stored value is not a snapshot object.
    #[error("saved code is corrupted: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Reads and writes the single snapshot slot of a [`KeyValueStore`].
#[derive(Debug)]
pub struct SnapshotStore<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Overwrites the slot with `source` captured at `captured_at`.
    pub fn save(
        &mut self,
        source: &SourceDocument,
        captured_at: DateTime<Utc>,
    ) -> Result<SavedSnapshot, PersistError> {
        let snapshot = SavedSnapshot::capture(source, captured_at);
        let json = serde_json::to_string(&snapshot).map_err(PersistError::Serialize)?;
        self.storage.set(&self.key, &json)?;
        log::info!("Saved snapshot under '{}' ({} bytes)", self.key, json.len());
        Ok(snapshot)
    }

    /// Reads the slot. Parsing is all-or-nothing: a corrupt value yields an
    /// error and no partial snapshot.
    pub fn load(&self) -> Result<LoadOutcome, PersistError> {
        let Some(json) = self.storage.get(&self.key)? else {
            return Ok(LoadOutcome::NothingSaved);
        };
        let value: serde_json::Value = serde_json::from_str(&json).map_err(PersistError::Corrupt)?;
        if !value.is_object() {
            return Err(PersistError::Corrupt(serde::de::Error::custom(
                "expected a JSON object",
            )));
        }
        let stored: StoredSnapshot = serde_json::from_value(value).map_err(PersistError::Corrupt)?;
        Ok(LoadOutcome::Loaded(stored.into()))
    }

    /// Deletes the slot. Deleting an empty slot is not an error.
    pub fn forget(&mut self) -> Result<(), PersistError> {
        self.storage.remove(&self.key)?;
        log::info!("Removed snapshot under '{}'", self.key);
        Ok(())
    }
}
