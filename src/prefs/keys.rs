//! Preference keys and typed preference values.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;
use thiserror::Error;

// ===== PreferenceKey =====

/// Every persisted preference. Raw storage keys are validated at the
/// boundary through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    /// Timestamp display pattern.
    DateTimeFormat,
    /// UI font family.
    Font,
    /// Open the most recent suggestion on launch.
    IsOpenMostRecent,
    /// Command template for opening a source file at a line.
    DefaultEditor,
    /// Default sort direction for log tables.
    DefaultSort,
    /// Dark presentation.
    IsDarkMode,
    /// Use the "mark" application icon.
    IsMarkIcon,
}

impl PreferenceKey {
    /// All keys.
    pub const ALL: [PreferenceKey; 7] = [
        PreferenceKey::DateTimeFormat,
        PreferenceKey::Font,
        PreferenceKey::IsOpenMostRecent,
        PreferenceKey::DefaultEditor,
        PreferenceKey::DefaultSort,
        PreferenceKey::IsDarkMode,
        PreferenceKey::IsMarkIcon,
    ];

    /// Storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceKey::DateTimeFormat => "dateTimeFormat_v3",
            PreferenceKey::Font => "font",
            PreferenceKey::IsOpenMostRecent => "isOpenMostRecent",
            PreferenceKey::DefaultEditor => "defaultEditor",
            PreferenceKey::DefaultSort => "defaultSort",
            PreferenceKey::IsDarkMode => "isDarkMode",
            PreferenceKey::IsMarkIcon => "isMarkIcon",
        }
    }

    /// Shared defaults table for textual (unparsed) reads.
    ///
    /// Only keys stored as plain text have an entry; boolean keys rely on
    /// their per-field defaults in [`Preferences`](super::Preferences).
    pub fn table_default(&self) -> Option<String> {
        match self {
            PreferenceKey::DateTimeFormat => Some(DateTimeFormat::DEFAULT.to_string()),
            PreferenceKey::Font => Some(default_font().to_string()),
            PreferenceKey::DefaultEditor => Some(EditorCommand::DEFAULT.to_string()),
            PreferenceKey::DefaultSort => Some(SortDirection::default().as_str().to_string()),
            PreferenceKey::IsOpenMostRecent
            | PreferenceKey::IsDarkMode
            | PreferenceKey::IsMarkIcon => None,
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw key that names no known preference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown preference key: {0}")]
pub struct UnknownPreferenceKey(pub String);

impl FromStr for PreferenceKey {
    type Err = UnknownPreferenceKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PreferenceKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownPreferenceKey(s.to_string()))
    }
}

/// Platform default UI font.
pub fn default_font() -> &'static str {
    if cfg!(target_os = "macos") {
        "San Francisco"
    } else if cfg!(target_os = "windows") {
        "Segoe UI"
    } else {
        "Roboto"
    }
}

// ===== SortDirection =====

/// Sort direction of the log table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Oldest first (source order).
    #[serde(rename = "asc")]
    Ascending,
    /// Newest first.
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Stored text.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    /// The other direction.
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Stored sort text that is neither `asc` nor `desc`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort direction: {0}")]
pub struct InvalidSortDirection(pub String);

impl FromStr for SortDirection {
    type Err = InvalidSortDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            other => Err(InvalidSortDirection(other.to_string())),
        }
    }
}

// ===== DateTimeFormat =====

/// A date-fns style display pattern such as `HH:mm:ss (dd/MM)`.
///
/// Translated token by token into a chrono format string. Text inside
/// single quotes is literal; unknown letters pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeFormat {
    pattern: String,
    chrono: String,
}

/// Token table, longest tokens first so `MMMM` wins over `MM`.
const TOKENS: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("YYYY", "%Y"),
    ("MMMM", "%B"),
    ("EEEE", "%A"),
    ("MMM", "%b"),
    ("EEE", "%a"),
    ("SSS", "%3f"),
    ("yy", "%y"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("dd", "%d"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("M", "%-m"),
    ("d", "%-d"),
    ("D", "%-d"),
    ("H", "%-H"),
    ("h", "%-I"),
    ("m", "%-M"),
    ("s", "%-S"),
    ("a", "%p"),
];

impl DateTimeFormat {
    /// Default display pattern.
    pub const DEFAULT: &'static str = "HH:mm:ss (dd/MM)";

    /// Build from a pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let chrono = translate(&pattern);
        Self { pattern, chrono }
    }

    /// The pattern as stored.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render an instant.
    pub fn format(&self, instant: &NaiveDateTime) -> String {
        let mut out = String::new();
        if write!(out, "{}", instant.format(&self.chrono)).is_err() {
            // Only reachable if the translation emitted an invalid specifier.
            return instant.to_string();
        }
        out
    }
}

impl Default for DateTimeFormat {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        if c == '\'' {
            // Quoted literal up to the next quote (or the end).
            let body = &rest[1..];
            let end = body.find('\'').unwrap_or(body.len());
            push_literal(&mut out, &body[..end]);
            rest = body.get(end + 1..).unwrap_or("");
            continue;
        }

        if let Some((token, spec)) = TOKENS.iter().find(|(token, _)| rest.starts_with(token)) {
            out.push_str(spec);
            rest = &rest[token.len()..];
            continue;
        }

        push_literal(&mut out, &rest[..c.len_utf8()]);
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn push_literal(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}

// ===== EditorCommand =====

/// Command template for opening a file at a line, e.g.
/// `code --goto {filepath}:{line}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand(String);

impl EditorCommand {
    /// Default template.
    pub const DEFAULT: &'static str = "code --goto {filepath}:{line}";

    /// Wrap a template.
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// The template text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expand into argv, substituting placeholders per whitespace-separated
    /// word so paths containing spaces stay one argument.
    pub fn render(&self, file_path: &str, line: usize) -> Vec<String> {
        let line = line.to_string();
        self.0
            .split_whitespace()
            .map(|word| word.replace("{filepath}", file_path).replace("{line}", &line))
            .collect()
    }
}

impl Default for EditorCommand {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}
