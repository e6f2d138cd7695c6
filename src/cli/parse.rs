//! CLI parse: clap types for foldersync. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// Mirror a source directory onto a replica, re-syncing at a fixed interval
#[derive(Parser, Debug)]
#[command(name = "foldersync")]
#[command(about = "One-way periodic mirroring of a source directory onto a replica")]
pub struct Cli {
    /// Directory to mirror from (never modified)
    pub source: Option<PathBuf>,

    /// Directory kept identical to the source (created if missing)
    pub replica: Option<PathBuf>,

    /// Seconds between sync passes (default: 60)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Log file path (default: sync.log)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Configuration file path (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (file, stdout, stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Compare file contents by size and BLAKE3 digest instead of modification time
    #[arg(long)]
    pub checksum: bool,

    /// Log per-file failures and keep going instead of aborting the pass
    #[arg(long)]
    pub continue_on_error: bool,

    /// Run a single pass and exit
    #[arg(long)]
    pub once: bool,
}
