//! Configuration module.
//!
//! Layers, lowest to highest: built-in defaults, the TOML config file,
//! `SLEUTH_*` environment variables, and command-line flags.

pub mod loader;

pub use loader::{
    ConfigError, ConfigFile, ResolvedConfig, apply_cli_overrides, apply_env_overrides,
    default_config_path, default_log_path, default_preferences_path, load_config_with_precedence,
    merge_config,
};

/// Resolve the full configuration for a run.
///
/// # Errors
///
/// Returns error if a config file exists but cannot be read or parsed.
pub fn resolve(
    config_path: Option<std::path::PathBuf>,
    cli_scan_dirs: Vec<std::path::PathBuf>,
    cli_cache_path: Option<std::path::PathBuf>,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let config = apply_env_overrides(merge_config(file));
    Ok(apply_cli_overrides(config, cli_scan_dirs, cli_cache_path))
}
