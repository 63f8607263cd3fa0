//! Enumeration of keys in an external cache directory.
//!
//! The cache format is only readable through a platform tool, invoked as
//! `<tool> list <cache_path>`, which prints one key per line.

use crate::model::{CacheKeyError, LogEntry, LogFile, LogLevel, LogType};
use crate::state::cache_inspection_supported;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Lists the keys stored in a cache directory.
pub trait CacheKeyLister {
    /// Enumerate keys. The raw list may end with an empty key.
    ///
    /// # Errors
    ///
    /// Returns `CacheKeyError` if inspection is unsupported or the tool
    /// fails.
    fn list_keys(&self, cache_path: &Path) -> Result<Vec<String>, CacheKeyError>;
}

/// Runs the cache tool as a child process.
#[derive(Debug, Clone)]
pub struct CommandCacheKeyLister {
    tool: String,
    supported: bool,
}

impl CommandCacheKeyLister {
    /// Lister for `tool`, enabled only where cache inspection is supported.
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            supported: cache_inspection_supported(),
        }
    }

    /// Override the platform check.
    pub fn with_support(mut self, supported: bool) -> Self {
        self.supported = supported;
        self
    }
}

impl CacheKeyLister for CommandCacheKeyLister {
    fn list_keys(&self, cache_path: &Path) -> Result<Vec<String>, CacheKeyError> {
        if !self.supported {
            return Err(CacheKeyError::Unsupported);
        }

        debug!(tool = %self.tool, path = %cache_path.display(), "Running cache tool");
        let output = Command::new(&self.tool)
            .arg("list")
            .arg(cache_path)
            .output()
            .map_err(|source| CacheKeyError::Spawn {
                tool: self.tool.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CacheKeyError::ToolFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| CacheKeyError::InvalidOutput)?;
        Ok(split_keys(&stdout))
    }
}

/// One key per line, `\n` or `\r\n` terminated. A terminated last line
/// yields the trailing empty key the store expects to strip.
pub fn split_keys(stdout: &str) -> Vec<String> {
    let mut keys: Vec<String> = stdout.lines().map(str::to_string).collect();
    if stdout.ends_with('\n') {
        keys.push(String::new());
    }
    keys
}

/// Present enumerated keys as tool output, one row per key. The key and its
/// directory travel in the row metadata so the details pane can show them.
pub fn cache_keys_file(cache_path: &Path, keys: &[String]) -> LogFile {
    let dir = cache_path.display().to_string();
    let entries = keys
        .iter()
        .map(|key| {
            LogEntry::new("", LogLevel::Other, key.clone(), LogType::Unknown)
                .with_meta(serde_json::json!({ "cacheKey": key, "cachePath": dir }))
        })
        .collect();
    LogFile::tool(entries)
}

/// Cache directory implied by a discovered source: the path itself when it
/// is a directory, otherwise its parent.
pub fn cache_dir_for(path: &Path) -> Option<PathBuf> {
    if path.is_dir() {
        Some(path.to_path_buf())
    } else {
        path.parent().map(Path::to_path_buf)
    }
}
