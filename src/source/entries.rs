//! Loading already-parsed entries from JSON-lines files.
//!
//! Each non-blank line is one serialized [`LogEntry`]. The file's
//! provenance comes from its name (`browser.log`, `webapp-1.jsonl`, ...),
//! falling back to the entries' common `logType`.

use crate::model::{LogEntry, LogFile, LogType, SourceError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Provenance implied by a file name, if any.
pub fn log_type_from_name(path: &Path) -> LogType {
    let Some(stem) = path.file_name().and_then(|n| n.to_str()) else {
        return LogType::Unknown;
    };
    let stem = stem.to_ascii_lowercase();
    [
        LogType::Browser,
        LogType::Renderer,
        LogType::Webapp,
        LogType::Webview,
    ]
    .into_iter()
    .find(|t| stem.starts_with(t.as_str()))
    .unwrap_or(LogType::Unknown)
}

fn common_log_type(entries: &[LogEntry]) -> LogType {
    match entries.split_first() {
        Some((first, rest)) if rest.iter().all(|e| e.log_type() == first.log_type()) => {
            first.log_type()
        }
        _ => LogType::Unknown,
    }
}

/// Parse entries from any buffered reader. `path` is only used for errors.
///
/// # Errors
///
/// Returns `SourceError::Io` on read failure and `SourceError::InvalidEntry`
/// with the 1-based line number for the first line that does not decode.
pub fn parse_entries(reader: impl BufRead, path: &Path) -> Result<Vec<LogEntry>, SourceError> {
    let mut entries = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let entry: LogEntry =
            serde_json::from_str(&line).map_err(|e| SourceError::InvalidEntry {
                path: path.to_path_buf(),
                line: index + 1,
                message: e.to_string(),
            })?;
        entries.push(entry.with_line(index + 1));
    }

    Ok(entries)
}

/// Load one entries file as a processed log file.
///
/// # Errors
///
/// Returns `SourceError::FileNotFound` if the file does not exist, plus the
/// errors of [`parse_entries`].
pub fn load_log_file(path: &Path) -> Result<LogFile, SourceError> {
    if !path.exists() {
        return Err(SourceError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_entries(BufReader::new(file), path)?;

    let log_type = match log_type_from_name(path) {
        LogType::Unknown => common_log_type(&entries),
        named => named,
    };
    debug!(path = %path.display(), ?log_type, "Resolved provenance");
    info!(path = %path.display(), entries = entries.len(), "Loaded entries");

    Ok(LogFile::processed(path, log_type, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogLevel;
    use std::fs;
    use std::io::Cursor;

    const TWO_LINES: &str = r#"{"timestamp":"10:00:01","moment":"2024-05-01T10:00:01","level":"info","message":"ready","logType":"renderer"}

{"timestamp":"10:00:02","level":"warn","message":"slow","logType":"renderer","meta":{"ms":812}}
"#;

    #[test]
    fn parses_lines_and_skips_blanks() {
        let entries = parse_entries(Cursor::new(TWO_LINES), Path::new("mem")).expect("parse");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level(), LogLevel::Info);
        assert!(entries[0].moment().is_some());
        assert_eq!(entries[1].level(), LogLevel::Warning);
        assert!(entries[1].has_meta());
        assert_eq!(entries[0].line(), Some(1));
        assert_eq!(entries[1].line(), Some(3));
    }

    #[test]
    fn invalid_line_reports_line_number() {
        let input = "{\"timestamp\":\"t\",\"level\":\"info\",\"message\":\"ok\"}\nnot json\n";
        let err = parse_entries(Cursor::new(input), Path::new("bad.jsonl")).expect_err("should fail");
        assert!(matches!(err, SourceError::InvalidEntry { line: 2, .. }), "got {err:?}");
    }

    #[test]
    fn provenance_from_file_name() {
        assert_eq!(log_type_from_name(Path::new("/x/webapp-2.jsonl")), LogType::Webapp);
        assert_eq!(log_type_from_name(Path::new("Browser.log")), LogType::Browser);
        assert_eq!(log_type_from_name(Path::new("app.jsonl")), LogType::Unknown);
    }

    #[test]
    fn load_falls_back_to_entry_provenance() {
        let path = std::env::temp_dir().join("sleuth_entries_fallback.jsonl");
        fs::write(&path, TWO_LINES).expect("write");

        let file = load_log_file(&path).expect("load");
        let _ = fs::remove_file(&path);

        assert_eq!(file.len(), 2);
        assert_eq!(file.log_type(), LogType::Renderer);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_log_file(Path::new("/nonexistent/sleuth.jsonl")).expect_err("missing");
        assert!(matches!(err, SourceError::FileNotFound { .. }));
    }
}
