//! View predicates over entries: level filter and date range.

use crate::model::{LogEntry, LogLevel};
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ===== FilterLevel =====

/// Levels that can be toggled in the level filter. Closed key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterLevel {
    /// Error entries.
    Error,
    /// Warning entries.
    Warning,
    /// Info entries.
    Info,
    /// Debug entries.
    Debug,
}

impl FilterLevel {
    /// All filterable levels in button order.
    pub const ALL: [FilterLevel; 4] = [
        FilterLevel::Error,
        FilterLevel::Warning,
        FilterLevel::Info,
        FilterLevel::Debug,
    ];

    /// Key name as used by the filter controls.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterLevel::Error => "error",
            FilterLevel::Warning => "warning",
            FilterLevel::Info => "info",
            FilterLevel::Debug => "debug",
        }
    }

    fn slot(self) -> usize {
        match self {
            FilterLevel::Error => 0,
            FilterLevel::Warning => 1,
            FilterLevel::Info => 2,
            FilterLevel::Debug => 3,
        }
    }
}

impl fmt::Display for FilterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A level name that is not part of the filter key set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter level: {0}")]
pub struct UnknownFilterLevel(pub String);

impl FromStr for FilterLevel {
    type Err = UnknownFilterLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(FilterLevel::Error),
            "warning" | "warn" => Ok(FilterLevel::Warning),
            "info" => Ok(FilterLevel::Info),
            "debug" => Ok(FilterLevel::Debug),
            other => Err(UnknownFilterLevel(other.to_string())),
        }
    }
}

impl From<FilterLevel> for LogLevel {
    fn from(level: FilterLevel) -> Self {
        match level {
            FilterLevel::Error => LogLevel::Error,
            FilterLevel::Warning => LogLevel::Warning,
            FilterLevel::Info => LogLevel::Info,
            FilterLevel::Debug => LogLevel::Debug,
        }
    }
}

// ===== LevelFilter =====

/// Per-level "hidden" flags. Default: nothing hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelFilter {
    hidden: [bool; 4],
}

impl LevelFilter {
    /// Whether entries of `level` are filtered out.
    pub fn is_hidden(&self, level: FilterLevel) -> bool {
        self.hidden[level.slot()]
    }

    /// Set the hidden flag for one level.
    pub fn set(&mut self, level: FilterLevel, hidden: bool) {
        self.hidden[level.slot()] = hidden;
    }

    /// Flip the hidden flag for one level.
    pub fn toggle(&mut self, level: FilterLevel) {
        let slot = level.slot();
        self.hidden[slot] = !self.hidden[slot];
    }

    /// Clear every flag.
    pub fn clear(&mut self) {
        self.hidden = [false; 4];
    }

    /// True when no level is hidden.
    pub fn is_empty(&self) -> bool {
        !self.hidden.iter().any(|h| *h)
    }

    /// Whether an entry level passes the filter. `Other` always passes.
    pub fn allows(&self, level: LogLevel) -> bool {
        let filter_level = match level {
            LogLevel::Error => FilterLevel::Error,
            LogLevel::Warning => FilterLevel::Warning,
            LogLevel::Info => FilterLevel::Info,
            LogLevel::Debug => FilterLevel::Debug,
            LogLevel::Other => return true,
        };
        !self.is_hidden(filter_level)
    }
}

// ===== DateRange =====

/// Optional bounds on the visible time window. Both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    /// Lower bound, unbounded when `None`.
    pub from: Option<NaiveDateTime>,
    /// Upper bound, unbounded when `None`.
    pub to: Option<NaiveDateTime>,
}

impl DateRange {
    /// Unbounded on both sides.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// True when neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Whether an instant lies within the range.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.from.is_none_or(|from| instant >= from) && self.to.is_none_or(|to| instant <= to)
    }

    /// Whether an entry is visible under this range.
    ///
    /// Entries without a normalised instant cannot be placed and stay visible.
    pub fn admits(&self, entry: &LogEntry) -> bool {
        entry.moment().is_none_or(|m| self.contains(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogType;
    use chrono::NaiveDate;

    fn instant(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid time")
    }

    #[test]
    fn default_filter_allows_everything() {
        let filter = LevelFilter::default();
        assert!(filter.is_empty());
        for level in [LogLevel::Error, LogLevel::Warning, LogLevel::Info, LogLevel::Debug, LogLevel::Other] {
            assert!(filter.allows(level));
        }
    }

    #[test]
    fn hidden_level_is_rejected() {
        let mut filter = LevelFilter::default();
        filter.toggle(FilterLevel::Error);
        assert!(!filter.allows(LogLevel::Error));
        assert!(filter.allows(LogLevel::Warning));
        assert!(filter.allows(LogLevel::Other));
    }

    #[test]
    fn parses_known_names_and_rejects_unknown() {
        assert_eq!("warning".parse::<FilterLevel>(), Ok(FilterLevel::Warning));
        assert_eq!("warn".parse::<FilterLevel>(), Ok(FilterLevel::Warning));
        assert_eq!(
            "verbose".parse::<FilterLevel>(),
            Err(UnknownFilterLevel("verbose".to_string()))
        );
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let range = DateRange { from: Some(instant(8)), to: Some(instant(10)) };
        assert!(range.contains(instant(8)));
        assert!(range.contains(instant(10)));
        assert!(!range.contains(instant(7)));
        assert!(!range.contains(instant(11)));
    }

    #[test]
    fn half_open_range() {
        let range = DateRange { from: None, to: Some(instant(10)) };
        assert!(range.contains(instant(0)));
        assert!(!range.contains(instant(11)));
        assert!(!range.is_unbounded());
    }

    #[test]
    fn entries_without_moment_are_admitted() {
        let range = DateRange { from: Some(instant(8)), to: None };
        let entry = LogEntry::new("garbled", LogLevel::Info, "m", LogType::Webapp);
        assert!(range.admits(&entry));
    }
}
