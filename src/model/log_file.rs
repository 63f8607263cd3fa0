//! Log file collections.
//!
//! A LogFile owns an ordered, immutable sequence of entries. The display
//! order is fixed at construction: source order for single files, timestamp
//! interleaving for merged files. Filtering only hides rows, never reorders.

use crate::model::{LogEntry, LogType};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ===== LogFileKind =====

/// What a LogFile was produced from - exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFileKind {
    /// A single processed source file.
    Processed,
    /// Several sources interleaved by timestamp.
    Merged,
    /// Structured output of an auxiliary tool (e.g. a cache dump).
    Tool,
}

// ===== LogFile =====

/// An ordered, named collection of entries.
///
/// Entries sit behind an `Arc` so the store, the table and the detail pane
/// share them without copying.
#[derive(Debug, Clone)]
pub struct LogFile {
    kind: LogFileKind,
    log_type: LogType,
    path: Option<PathBuf>,
    entries: Arc<[LogEntry]>,
}

impl LogFile {
    /// Create a single-source file.
    pub fn processed(path: impl Into<PathBuf>, log_type: LogType, entries: Vec<LogEntry>) -> Self {
        Self {
            kind: LogFileKind::Processed,
            log_type,
            path: Some(path.into()),
            entries: entries.into(),
        }
    }

    /// Wrap auxiliary tool output.
    pub fn tool(entries: Vec<LogEntry>) -> Self {
        Self {
            kind: LogFileKind::Tool,
            log_type: LogType::Unknown,
            path: None,
            entries: entries.into(),
        }
    }

    /// Interleave several files by normalised instant.
    ///
    /// The merge is stable: ties keep the order of `files`, and entries
    /// without a `moment` stay right after the preceding entry of their own
    /// source. The merged file's provenance is the common `LogType` of all
    /// inputs, or `Unknown` when they differ.
    pub fn merge(files: &[LogFile]) -> Self {
        let log_type = match files.split_first() {
            Some((first, rest)) if rest.iter().all(|f| f.log_type == first.log_type) => {
                first.log_type
            }
            _ => LogType::Unknown,
        };

        // Each source contributes runs: a timestamped entry followed by any
        // untimestamped entries that trail it. Runs are merged by their key.
        let mut cursors: Vec<usize> = vec![0; files.len()];
        let total: usize = files.iter().map(|f| f.entries.len()).sum();
        let mut merged = Vec::with_capacity(total);

        loop {
            let mut best: Option<(usize, Option<chrono::NaiveDateTime>)> = None;
            for (source, file) in files.iter().enumerate() {
                let Some(entry) = file.entries.get(cursors[source]) else {
                    continue;
                };
                let key = entry.moment();
                let better = match (&best, key) {
                    (None, _) => true,
                    // Untimestamped heads drain before anything else so they
                    // stay glued to their predecessor.
                    (Some((_, Some(_))), None) => true,
                    (Some((_, Some(b))), Some(k)) => k < *b,
                    (Some((_, None)), _) => false,
                };
                if better {
                    best = Some((source, key));
                }
            }

            let Some((source, _)) = best else {
                break;
            };
            merged.push(files[source].entries[cursors[source]].clone());
            cursors[source] += 1;
        }

        Self {
            kind: LogFileKind::Merged,
            log_type,
            path: None,
            entries: merged.into(),
        }
    }

    // ===== Accessors =====

    /// Kind tag.
    pub fn kind(&self) -> LogFileKind {
        self.kind
    }

    /// Provenance of the whole file.
    pub fn log_type(&self) -> LogType {
        self.log_type
    }

    /// Path the file was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// All entries in display order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entry at a source index.
    pub fn entry(&self, index: usize) -> Option<&LogEntry> {
        self.entries.get(index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the file has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogLevel;
    use chrono::NaiveDate;

    fn at(second: u32, message: &str) -> LogEntry {
        let moment = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, second))
            .expect("valid time");
        LogEntry::new(format!("12:00:{second:02}"), LogLevel::Info, message, LogType::Browser)
            .with_moment(moment)
    }

    fn messages(file: &LogFile) -> Vec<&str> {
        file.entries().iter().map(|e| e.message()).collect()
    }

    #[test]
    fn merge_interleaves_by_moment() {
        let a = LogFile::processed("a.log", LogType::Browser, vec![at(1, "a1"), at(5, "a5")]);
        let b = LogFile::processed("b.log", LogType::Browser, vec![at(2, "b2"), at(4, "b4")]);

        let merged = LogFile::merge(&[a, b]);

        assert_eq!(merged.kind(), LogFileKind::Merged);
        assert_eq!(messages(&merged), vec!["a1", "b2", "b4", "a5"]);
        assert_eq!(merged.log_type(), LogType::Browser);
    }

    #[test]
    fn merge_is_stable_on_ties() {
        let a = LogFile::processed("a.log", LogType::Browser, vec![at(3, "a")]);
        let b = LogFile::processed("b.log", LogType::Renderer, vec![at(3, "b")]);

        let merged = LogFile::merge(&[a, b]);

        assert_eq!(messages(&merged), vec!["a", "b"]);
        assert_eq!(merged.log_type(), LogType::Unknown);
    }

    #[test]
    fn merge_keeps_untimestamped_entries_after_predecessor() {
        let loose = LogEntry::new("??", LogLevel::Info, "a1-cont", LogType::Browser);
        let a = LogFile::processed("a.log", LogType::Browser, vec![at(1, "a1"), loose, at(6, "a6")]);
        let b = LogFile::processed("b.log", LogType::Browser, vec![at(2, "b2")]);

        let merged = LogFile::merge(&[a, b]);

        assert_eq!(messages(&merged), vec!["a1", "a1-cont", "b2", "a6"]);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        let merged = LogFile::merge(&[]);
        assert!(merged.is_empty());
        assert_eq!(merged.log_type(), LogType::Unknown);
    }
}
