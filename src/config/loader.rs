//! Configuration file loading with precedence handling.

use crate::view_state::log_table::DEFAULT_OVERSCAN_ROWS;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default search debounce in milliseconds.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 700;

/// Default cache tool executable.
pub const DEFAULT_CACHE_TOOL: &str = "cachetool";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/sleuth/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Path to the persisted preferences file.
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,

    /// Directories scanned for log bundles.
    #[serde(default)]
    pub scan_dirs: Option<Vec<PathBuf>>,

    /// File extensions (without dot) considered log bundles.
    #[serde(default)]
    pub scan_extensions: Option<Vec<String>>,

    /// Rows rendered beyond the viewport on each side.
    #[serde(default)]
    pub overscan_rows: Option<usize>,

    /// Quiet period before search input is applied.
    #[serde(default)]
    pub search_debounce_ms: Option<u64>,

    /// Executable used to enumerate cache keys.
    #[serde(default)]
    pub cache_tool: Option<String>,

    /// Cache directory to inspect at startup.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Preferences file.
    pub preferences_path: PathBuf,
    /// Directories scanned for suggestions.
    pub scan_dirs: Vec<PathBuf>,
    /// Extensions considered log bundles.
    pub scan_extensions: Vec<String>,
    /// Overscan rows for the log table.
    pub overscan_rows: usize,
    /// Search debounce in milliseconds.
    pub search_debounce_ms: u64,
    /// Cache tool executable.
    pub cache_tool: String,
    /// Cache directory inspected at startup, if any.
    pub cache_path: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            log_file_path: default_log_path(),
            preferences_path: default_preferences_path(),
            scan_dirs: default_scan_dirs(),
            scan_extensions: vec!["log".to_string(), "jsonl".to_string()],
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            cache_tool: DEFAULT_CACHE_TOOL.to_string(),
            cache_path: None,
        }
    }
}

impl ResolvedConfig {
    /// Search debounce as a duration.
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/sleuth/sleuth.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("sleuth").join("sleuth.log")
    } else {
        PathBuf::from("sleuth.log")
    }
}

/// Resolve default preferences path next to the config file.
pub fn default_preferences_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("sleuth").join("preferences.json"))
        .unwrap_or_else(|| PathBuf::from("sleuth-preferences.json"))
}

/// Directories scanned when none are configured: the downloads folder.
pub fn default_scan_dirs() -> Vec<PathBuf> {
    dirs::download_dir().into_iter().collect()
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/sleuth/config.toml` on Unix, appropriate path on other platforms.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sleuth").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `SLEUTH_CONFIG` environment variable
/// 3. Default path `~/.config/sleuth/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("SLEUTH_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        preferences_path: config.preferences_path.unwrap_or(defaults.preferences_path),
        scan_dirs: config.scan_dirs.unwrap_or(defaults.scan_dirs),
        scan_extensions: config.scan_extensions.unwrap_or(defaults.scan_extensions),
        overscan_rows: config.overscan_rows.unwrap_or(defaults.overscan_rows),
        search_debounce_ms: config
            .search_debounce_ms
            .unwrap_or(defaults.search_debounce_ms),
        cache_tool: config.cache_tool.unwrap_or(defaults.cache_tool),
        cache_path: config.cache_path.or(defaults.cache_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `SLEUTH_LOG_FILE`: Override tracing log path
/// - `SLEUTH_PREFERENCES`: Override preferences path
/// - `SLEUTH_CACHE_TOOL`: Override cache tool executable
/// - `SLEUTH_CACHE_PATH`: Cache directory to inspect at startup
/// - `SLEUTH_SEARCH_DEBOUNCE_MS`: Override search debounce (ignored if not a number)
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(path) = std::env::var("SLEUTH_LOG_FILE") {
        config.log_file_path = PathBuf::from(path);
    }

    if let Ok(path) = std::env::var("SLEUTH_PREFERENCES") {
        config.preferences_path = PathBuf::from(path);
    }

    if let Ok(tool) = std::env::var("SLEUTH_CACHE_TOOL") {
        config.cache_tool = tool;
    }

    if let Ok(path) = std::env::var("SLEUTH_CACHE_PATH") {
        config.cache_path = Some(PathBuf::from(path));
    }

    if let Some(ms) = std::env::var("SLEUTH_SEARCH_DEBOUNCE_MS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.search_debounce_ms = ms;
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    scan_dirs: Vec<PathBuf>,
    cache_path_override: Option<PathBuf>,
) -> ResolvedConfig {
    if !scan_dirs.is_empty() {
        config.scan_dirs = scan_dirs;
    }

    if let Some(path) = cache_path_override {
        config.cache_path = Some(path);
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
