//! Candidate log sources discovered by the suggestion scanner.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A candidate source: path plus modification time in milliseconds since
/// the Unix epoch. Ordering for "most recent" is by `mtime_ms` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Path of the archive or folder.
    pub file_path: PathBuf,
    /// Modification time, milliseconds since the Unix epoch.
    pub mtime_ms: i64,
}

impl Suggestion {
    /// Create a suggestion.
    pub fn new(file_path: impl Into<PathBuf>, mtime_ms: i64) -> Self {
        Self {
            file_path: file_path.into(),
            mtime_ms,
        }
    }
}

/// Pick the suggestion with the largest modification time.
///
/// Linear scan with the first element as the initial candidate and a strict
/// greater-than comparison, so on ties the earliest-seen maximum wins.
pub fn most_recent(suggestions: &[Suggestion]) -> Option<&Suggestion> {
    let (first, rest) = suggestions.split_first()?;
    let mut best = first;
    for candidate in rest {
        if candidate.mtime_ms > best.mtime_ms {
            best = candidate;
        }
    }
    Some(best)
}
