//! Sleuth - Entry Point

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Sleuth - terminal inspector for diagnostic log bundles
#[derive(Parser, Debug)]
#[command(name = "sleuth")]
#[command(version)]
#[command(about = "Filter, search and inspect parsed diagnostic log files")]
pub struct Args {
    /// Log file to open (otherwise pick one from the discovered list)
    pub file: Option<PathBuf>,

    /// Directory to scan for log bundles (repeatable; replaces the defaults)
    #[arg(long = "scan-dir", value_name = "DIR")]
    pub scan_dirs: Vec<PathBuf>,

    /// Cache directory to inspect at startup
    #[arg(long = "cache-path", value_name = "DIR")]
    pub cache_path: Option<PathBuf>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set NO_COLOR env var if --no-color flag is passed
    if args.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    // Defaults → Config File → Env Vars → CLI Args
    let config = sleuth::config::resolve(
        args.config.clone(),
        args.scan_dirs.clone(),
        args.cache_path.clone(),
    )?;

    sleuth::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        file = ?args.file,
        "Configuration loaded and resolved"
    );

    sleuth::view::run(&config, args.file)?;

    Ok(())
}
