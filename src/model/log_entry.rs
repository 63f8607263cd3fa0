//! Log entry types representing already-parsed log records.
//!
//! LogEntry is immutable once constructed. The table, the detail pane and
//! the filter pipeline only ever borrow entries.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ===== LogLevel =====

/// Severity of a log entry - exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error severity.
    Error,
    /// Warning severity. Accepts the short `warn` spelling on input.
    #[serde(alias = "warn")]
    Warning,
    /// Informational severity.
    Info,
    /// Debug severity.
    Debug,
    /// Anything the parser could not classify. Never hidden by the level filter.
    #[serde(other)]
    Other,
}

impl LogLevel {
    /// Lower-case display label used in the level column.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Other => "other",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== LogType =====

/// Provenance of the process that emitted an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    /// Main (browser) process.
    Browser,
    /// Renderer process.
    Renderer,
    /// Web application logs. Least structured source; parsing is best-effort.
    Webapp,
    /// Embedded webview.
    Webview,
    /// Provenance not known.
    #[default]
    #[serde(other)]
    Unknown,
}

impl LogType {
    /// Lower-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Browser => "browser",
            LogType::Renderer => "renderer",
            LogType::Webapp => "webapp",
            LogType::Webview => "webview",
            LogType::Unknown => "unknown",
        }
    }

    /// Whether entries of this type come from the least structured source.
    pub fn is_best_effort(&self) -> bool {
        matches!(self, LogType::Webapp)
    }
}

impl FromStr for LogType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "browser" => LogType::Browser,
            "renderer" => LogType::Renderer,
            "webapp" => LogType::Webapp,
            "webview" => LogType::Webview,
            _ => LogType::Unknown,
        })
    }
}

// ===== LogEntry =====

/// One parsed log record.
///
/// `timestamp` keeps the source-native text; `moment` is the normalised
/// instant when the parser managed to produce one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    timestamp: String,
    #[serde(default)]
    moment: Option<NaiveDateTime>,
    level: LogLevel,
    message: String,
    #[serde(default)]
    log_type: LogType,
    #[serde(default)]
    meta: Option<serde_json::Value>,
    #[serde(skip)]
    line: Option<usize>,
}

impl LogEntry {
    /// Create a new entry without a normalised instant or metadata.
    pub fn new(
        timestamp: impl Into<String>,
        level: LogLevel,
        message: impl Into<String>,
        log_type: LogType,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            moment: None,
            level,
            message: message.into(),
            log_type,
            meta: None,
            line: None,
        }
    }

    /// Attach the normalised instant.
    pub fn with_moment(mut self, moment: NaiveDateTime) -> Self {
        self.moment = Some(moment);
        self
    }

    /// Record the 1-based line the entry was read from.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach structured metadata for the detail viewer.
    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }

    // ===== Accessors (read-only) =====

    /// Raw timestamp text as it appeared in the source.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Normalised instant, if parsed.
    pub fn moment(&self) -> Option<NaiveDateTime> {
        self.moment
    }

    /// Severity.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Process provenance.
    pub fn log_type(&self) -> LogType {
        self.log_type
    }

    /// Source line, when loaded from a file.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Structured payload.
    pub fn meta(&self) -> Option<&serde_json::Value> {
        self.meta.as_ref()
    }

    /// Whether the entry carries structured metadata worth showing.
    ///
    /// JSON `null` counts as no metadata.
    pub fn has_meta(&self) -> bool {
        matches!(&self.meta, Some(v) if !v.is_null())
    }
}
