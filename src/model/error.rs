//! Error types for sleuth.
//!
//! Errors are `thiserror` enums carrying structured context and compose via
//! `?` and `From`. Collaborator failures (suggestion scan, cache-key
//! listing) are recoverable: the store keeps its prior data and queues a
//! notification. Preference decode failures never reach this module at all;
//! they degrade to an absent value inside the preference store.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to load an entries file.
    #[error("Failed to load log source: {0}")]
    Source(#[from] SourceError),

    /// Preference backend failed.
    #[error("Preference store error: {0}")]
    Preference(#[from] PreferenceError),

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Failures of the durable key-value backend.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Reading or writing the backing file failed.
    #[error("Preference file I/O at {path}: {source}")]
    Io {
        /// Backing file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The in-memory map could not be encoded for writing.
    #[error("Failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure of the suggestion scanner.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A scan directory could not be listed.
    #[error("Failed to scan {path}: {source}")]
    ReadDir {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure of the external cache-key lister.
#[derive(Debug, Error)]
pub enum CacheKeyError {
    /// The platform does not support the cache format.
    #[error("Cache inspection is not supported on this platform")]
    Unsupported,

    /// The external tool could not be started.
    #[error("Failed to run cache tool `{tool}`: {source}")]
    Spawn {
        /// Tool command.
        tool: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The tool exited unsuccessfully.
    #[error("Cache tool exited with status {status}: {stderr}")]
    ToolFailed {
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The tool produced output that is not UTF-8.
    #[error("Cache tool output is not valid UTF-8")]
    InvalidOutput,
}

/// Failure launching the configured editor.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The editor template expands to nothing.
    #[error("Editor command is empty")]
    EmptyCommand,

    /// The editor process could not be started.
    #[error("Failed to start editor `{program}`: {source}")]
    Spawn {
        /// Program named by the template.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure loading an entries file.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file does not exist.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Reading failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line is not a valid entry.
    #[error("Invalid entry at {path}:{line}: {message}")]
    InvalidEntry {
        /// File path.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Decoder message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_entry_names_location() {
        let err = SourceError::InvalidEntry {
            path: PathBuf::from("/tmp/app.jsonl"),
            line: 7,
            message: "expected value".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("/tmp/app.jsonl:7"), "got: {text}");
    }

    #[test]
    fn source_error_converts_to_app_error() {
        fn load() -> Result<(), AppError> {
            Err(SourceError::FileNotFound { path: PathBuf::from("x") })?
        }
        assert!(matches!(load(), Err(AppError::Source(_))));
    }
}
