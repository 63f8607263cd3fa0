//! Typed retrieve/save over a [`KeyValueBackend`].

use super::backend::KeyValueBackend;
use super::keys::PreferenceKey;
use crate::model::PreferenceError;
use serde::de::DeserializeOwned;
use tracing::debug;

// ===== PrefValue =====

/// A value handed to [`PreferenceStore::save`].
///
/// Objects and arrays are stored as JSON text, primitives as their literal
/// text. `Absent` (and JSON `null`) removes the key.
#[derive(Debug, Clone, PartialEq)]
pub enum PrefValue {
    /// No value: the key is removed.
    Absent,
    /// Plain text, stored verbatim.
    Text(String),
    /// Boolean, stored as `true` / `false`.
    Bool(bool),
    /// Integer, stored in decimal.
    Int(i64),
    /// Float, stored in its shortest round-tripping form.
    Float(f64),
    /// Structured value.
    Json(serde_json::Value),
}

impl PrefValue {
    /// Textual storage form, or `None` when the key should be removed.
    pub fn to_storage(&self) -> Option<String> {
        match self {
            PrefValue::Absent => None,
            PrefValue::Text(s) => Some(s.clone()),
            PrefValue::Bool(b) => Some(b.to_string()),
            PrefValue::Int(i) => Some(i.to_string()),
            PrefValue::Float(f) => Some(f.to_string()),
            PrefValue::Json(serde_json::Value::Null) => None,
            PrefValue::Json(serde_json::Value::String(s)) => Some(s.clone()),
            PrefValue::Json(other) => Some(other.to_string()),
        }
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::Text(value.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::Text(value)
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Bool(value)
    }
}

impl From<i64> for PrefValue {
    fn from(value: i64) -> Self {
        PrefValue::Int(value)
    }
}

impl From<f64> for PrefValue {
    fn from(value: f64) -> Self {
        PrefValue::Float(value)
    }
}

impl From<serde_json::Value> for PrefValue {
    fn from(value: serde_json::Value) -> Self {
        PrefValue::Json(value)
    }
}

impl<T: Into<PrefValue>> From<Option<T>> for PrefValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PrefValue::Absent, Into::into)
    }
}

// ===== PreferenceStore =====

/// Typed access to durable preferences.
pub struct PreferenceStore {
    backend: Box<dyn KeyValueBackend>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

impl PreferenceStore {
    /// Wrap a backend.
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Unparsed read: the stored text, or the key's table default when
    /// nothing is stored, or `None` when the key has no table default.
    pub fn retrieve_text(&self, key: PreferenceKey) -> Option<String> {
        self.backend
            .get(key.as_str())
            .or_else(|| key.table_default())
    }

    /// Parsed read: the stored text decoded as JSON into `T`.
    ///
    /// Absence and decode failures both yield `None`; table defaults are
    /// not consulted.
    pub fn retrieve_parsed<T: DeserializeOwned>(&self, key: PreferenceKey) -> Option<T> {
        let raw = self.backend.get(key.as_str())?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key = %key, error = %e, "Stored preference failed to decode");
                None
            }
        }
    }

    /// `retrieve(key, parse)`: a single entry point over both read modes,
    /// returning the result as a JSON value.
    pub fn retrieve(&self, key: PreferenceKey, parse: bool) -> Option<serde_json::Value> {
        if parse {
            self.retrieve_parsed(key)
        } else {
            self.retrieve_text(key).map(serde_json::Value::String)
        }
    }

    /// Persist a value, or remove the key when the value is absent.
    pub fn save(&mut self, key: PreferenceKey, value: impl Into<PrefValue>) -> Result<(), PreferenceError> {
        match value.into().to_storage() {
            Some(text) => self.backend.set(key.as_str(), &text),
            None => self.backend.remove(key.as_str()),
        }
    }
}
