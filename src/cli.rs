//! CLI domain: argument parsing and the overlay of flags onto loaded configuration.

mod parse;

pub use parse::Cli;

use crate::compare::CompareMode;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::reconcile::ErrorPolicy;
use clap::CommandFactory;
use std::path::PathBuf;

impl Cli {
    /// Source and replica, or `None` when either positional argument is missing
    pub fn roots(&self) -> Option<(PathBuf, PathBuf)> {
        match (&self.source, &self.replica) {
            (Some(source), Some(replica)) => Some((source.clone(), replica.clone())),
            _ => None,
        }
    }

    /// Apply CLI flags on top of file and environment configuration
    ///
    /// Flags always win. The result is validated again since flags can carry
    /// values (such as `--interval 0`) that the loader never saw.
    pub fn apply_to(&self, config: &mut SyncConfig) -> Result<(), SyncError> {
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(ref log) = self.log {
            config.logging.file = log.clone();
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(ref format) = self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(ref output) = self.log_output {
            config.logging.output = output.clone();
        }
        if self.checksum {
            config.compare = CompareMode::Checksum;
        }
        if self.continue_on_error {
            config.on_error = ErrorPolicy::Continue;
        }
        config.validate()
    }
}

/// Usage text printed when the positional arguments are missing
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}
