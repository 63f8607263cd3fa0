//! Discovery of candidate log sources.

use crate::model::{ScanError, Suggestion};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::debug;

/// Enumerates candidate sources. Order of the result is not meaningful.
pub trait SuggestionScanner {
    /// Scan for candidates.
    ///
    /// # Errors
    ///
    /// Returns `ScanError` when a configured location exists but cannot be
    /// listed.
    fn scan(&self) -> Result<Vec<Suggestion>, ScanError>;
}

/// Lists files with matching extensions in a set of directories.
///
/// Directories that do not exist are skipped; subdirectories are not
/// descended into.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    dirs: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl DirectoryScanner {
    /// Create a scanner. Extensions are matched case-insensitively and
    /// without the leading dot.
    pub fn new(dirs: Vec<PathBuf>, extensions: Vec<String>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self { dirs, extensions }
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
    }

    fn scan_dir(&self, dir: &Path, out: &mut Vec<Suggestion>) -> Result<(), ScanError> {
        let read_dir = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "Scan directory missing, skipping");
                return Ok(());
            }
            Err(source) => {
                return Err(ScanError::ReadDir {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        };

        for entry in read_dir.flatten() {
            let path = entry.path();
            if !self.matches(&path) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let mtime_ms = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
                .unwrap_or(0);
            out.push(Suggestion::new(path, mtime_ms));
        }
        Ok(())
    }
}

impl SuggestionScanner for DirectoryScanner {
    fn scan(&self) -> Result<Vec<Suggestion>, ScanError> {
        let mut suggestions = Vec::new();
        for dir in &self.dirs {
            self.scan_dir(dir, &mut suggestions)?;
        }
        debug!(count = suggestions.len(), "Scan complete");
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create fixture dir");
        dir
    }

    #[test]
    fn lists_matching_files_only() {
        let dir = fixture_dir("sleuth_scan_matching");
        fs::write(dir.join("logs-1.zip"), b"").expect("write");
        fs::write(dir.join("logs-2.ZIP"), b"").expect("write");
        fs::write(dir.join("notes.txt"), b"").expect("write");
        fs::create_dir_all(dir.join("folder.zip")).expect("mkdir");

        let scanner = DirectoryScanner::new(vec![dir.clone()], vec![".zip".to_string()]);
        let mut names: Vec<String> = scanner
            .scan()
            .expect("scan")
            .into_iter()
            .filter_map(|s| s.file_path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(names, vec!["logs-1.zip", "logs-2.ZIP"]);
    }

    #[test]
    fn reports_modification_time() {
        let dir = fixture_dir("sleuth_scan_mtime");
        fs::write(dir.join("a.log"), b"x").expect("write");

        let scanner = DirectoryScanner::new(vec![dir.clone()], vec!["log".to_string()]);
        let found = scanner.scan().expect("scan");
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(found.len(), 1);
        assert!(found[0].mtime_ms > 0);
    }

    #[test]
    fn missing_directory_is_skipped() {
        let scanner = DirectoryScanner::new(
            vec![PathBuf::from("/nonexistent/sleuth/scan")],
            vec!["zip".to_string()],
        );
        assert_eq!(scanner.scan().expect("scan"), Vec::new());
    }
}
