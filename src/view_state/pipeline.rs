//! Filter/search/sort pipeline feeding the log table.
//!
//! All predicates are applied in one linear pass over the file. The output
//! is a list of entry indices in display order plus the row positions of
//! search matches; the file itself is never touched.

use crate::model::{DateRange, LevelFilter, LogEntry, LogFile};
use crate::prefs::SortDirection;

// ===== ViewPredicates =====

/// Snapshot of every predicate that shapes the visible rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewPredicates {
    /// Hidden levels.
    pub level_filter: LevelFilter,
    /// Lower-cased search needle. `None` when the search box is empty.
    pub needle: Option<String>,
    /// Hide rows that do not match the needle.
    pub show_only_search_results: bool,
    /// Visible time window.
    pub date_range: DateRange,
    /// Display order.
    pub sort: SortDirection,
}

impl ViewPredicates {
    /// Normalise raw search text into a needle: whitespace-only text means
    /// no search, and matching is case-insensitive.
    pub fn needle_from(search: &str) -> Option<String> {
        if search.trim().is_empty() {
            None
        } else {
            Some(search.to_lowercase())
        }
    }
}

/// Case-insensitive substring match against the message. `needle` must
/// already be lower-cased.
pub fn entry_matches(entry: &LogEntry, needle: &str) -> bool {
    let message = entry.message();
    if needle.is_empty() {
        return true;
    }
    if message.is_ascii() && needle.is_ascii() {
        // Avoid allocating for the common case.
        return message
            .as_bytes()
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle.as_bytes()));
    }
    message.to_lowercase().contains(needle)
}

// ===== FilteredView =====

/// Visible rows of one file under one set of predicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilteredView {
    rows: Vec<usize>,
    search_matches: Vec<usize>,
}

impl FilteredView {
    /// Run the pipeline.
    pub fn compute(file: &LogFile, predicates: &ViewPredicates) -> Self {
        let entries = file.entries();
        let mut rows = Vec::with_capacity(entries.len());
        let mut search_matches = Vec::new();

        let mut visit = |index: usize, entry: &LogEntry| {
            if !predicates.level_filter.allows(entry.level()) {
                return;
            }
            if !predicates.date_range.admits(entry) {
                return;
            }

            let is_match = predicates
                .needle
                .as_deref()
                .map(|needle| entry_matches(entry, needle));

            if predicates.show_only_search_results && is_match == Some(false) {
                return;
            }

            if is_match == Some(true) {
                search_matches.push(rows.len());
            }
            rows.push(index);
        };

        match predicates.sort {
            SortDirection::Ascending => {
                for (index, entry) in entries.iter().enumerate() {
                    visit(index, entry);
                }
            }
            SortDirection::Descending => {
                for (index, entry) in entries.iter().enumerate().rev() {
                    visit(index, entry);
                }
            }
        }

        Self {
            rows,
            search_matches,
        }
    }

    /// Entry indices in display order.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Entry index shown at a row.
    pub fn entry_index(&self, row: usize) -> Option<usize> {
        self.rows.get(row).copied()
    }

    /// Row showing a given entry, if visible.
    pub fn row_of(&self, entry_index: usize) -> Option<usize> {
        self.rows.iter().position(|&i| i == entry_index)
    }

    /// Rows (not entry indices) that match the search needle, top to bottom.
    pub fn search_matches(&self) -> &[usize] {
        &self.search_matches
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
