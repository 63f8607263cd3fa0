//! Durable string key-value backends for the preference store.
//!
//! Backends know nothing about types: values are strings or absent, and all
//! coercion happens in [`PreferenceStore`](super::PreferenceStore).

use crate::model::PreferenceError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// String-keyed storage with string-or-absent values.
pub trait KeyValueBackend {
    /// Read a stored value.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), PreferenceError>;
}

// ===== MemoryBackend =====

/// Process-local backend. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: BTreeMap<String, String>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-populated with raw values.
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferenceError> {
        self.values.remove(key);
        Ok(())
    }
}

// ===== JsonFileBackend =====

/// Backend persisted as one flat JSON object of string values.
///
/// The whole map is rewritten on every change through a temporary file and
/// a rename, so a crash mid-write leaves the previous file intact. A missing
/// or unreadable file starts out empty.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileBackend {
    /// Open (or lazily create) the backing file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load_map(&path);
        debug!(path = %path.display(), keys = values.len(), "Preference file opened");
        Self { path, values }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), PreferenceError> {
        let io_err = |source: std::io::Error| PreferenceError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl KeyValueBackend for JsonFileBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        if self.values.get(key).is_some_and(|v| v == value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferenceError> {
        if self.values.remove(key).is_none() {
            return Ok(());
        }
        self.persist()
    }
}

fn load_map(path: &Path) -> BTreeMap<String, String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Preference file unreadable, starting empty");
            return BTreeMap::new();
        }
    };

    serde_json::from_str(&contents).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Preference file corrupt, starting empty");
        BTreeMap::new()
    })
}
