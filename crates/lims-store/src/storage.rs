//! Client-local key-value storage
//!
//! Keeps small JSON blobs (session token, user profile, last filters) on the
//! client. Values are opaque to the backend; anything that no longer
//! decodes reads as absent.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Backing file could not be written
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be encoded
    #[error("cannot encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Raw string storage
pub trait KeyValueStore: Send + Sync {
    /// Stored text for `key`
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Store text under `key`
    ///
    /// # Errors
    /// Backend-specific write failure.
    fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove `key`
    ///
    /// # Errors
    /// Backend-specific write failure.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remove everything
    ///
    /// # Errors
    /// Backend-specific write failure.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries.write().clear();
        Ok(())
    }
}

/// Storage persisted as one JSON object in a file
///
/// The whole file is rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStorage {
    /// Open storage at `path`
    ///
    /// A missing file starts empty. So does an unreadable one, after a
    /// warning; it is overwritten on the next change.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "discarding corrupt storage file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read storage file");
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        entries.clear();
        self.persist(&entries)
    }
}

/// Typed JSON view over a [`KeyValueStore`]
#[derive(Debug)]
pub struct ClientStorage<S> {
    backend: S,
}

impl<S: KeyValueStore> ClientStorage<S> {
    /// Wrap a backend
    #[inline]
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Decoded value; `None` when absent or undecodable
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.backend.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring undecodable stored value");
                None
            }
        }
    }

    /// Encode and store a value
    ///
    /// # Errors
    /// `StorageError::Encode` or a backend write failure.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set_raw(key, raw)
    }

    /// Remove a value
    ///
    /// # Errors
    /// Backend write failure.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key)
    }

    /// Remove everything
    ///
    /// # Errors
    /// Backend write failure.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.clear()
    }

    /// Underlying backend
    #[inline]
    pub fn backend(&self) -> &S {
        &self.backend
    }
}
