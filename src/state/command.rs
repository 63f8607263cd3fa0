//! Work the store asks the shell to perform, and messages it hands back.
//!
//! Asynchronous collaborators are never called from inside the store.
//! Actions queue a [`Command`]; the runtime executes it between events and
//! delivers the result through `receive_*` on the store.

use std::path::PathBuf;

/// A pending request for an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Enumerate candidate sources.
    ScanSuggestions,
    /// Enumerate cache keys. `generation` identifies the request so late
    /// results of superseded requests can be discarded.
    ListCacheKeys {
        /// Request generation.
        generation: u64,
        /// Cache directory.
        cache_path: PathBuf,
    },
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational.
    Info,
    /// Recoverable failure.
    Warning,
}

/// A user-visible, non-fatal message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub text: String,
}

impl Notification {
    /// A warning.
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            text: text.into(),
        }
    }

    /// An informational message.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            text: text.into(),
        }
    }
}

/// Drop a single trailing empty key, an artifact of the lister's
/// newline-terminated output.
pub fn normalize_cache_keys(mut keys: Vec<String>) -> Vec<String> {
    if keys.last().is_some_and(|k| k.is_empty()) {
        keys.pop();
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strips_one_trailing_empty_key() {
        assert_eq!(normalize_cache_keys(keys(&["a", "b", ""])), keys(&["a", "b"]));
        assert_eq!(normalize_cache_keys(keys(&["a", "", ""])), keys(&["a", ""]));
    }

    #[test]
    fn leaves_other_lists_alone() {
        assert_eq!(normalize_cache_keys(keys(&["a", "", "b"])), keys(&["a", "", "b"]));
        assert!(normalize_cache_keys(vec![]).is_empty());
    }
}
