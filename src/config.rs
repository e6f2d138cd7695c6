//! Configuration System
//!
//! Layered configuration for the sync daemon. Sources, lowest precedence first:
//! built-in defaults, the global config file
//! (`$XDG_CONFIG_HOME/foldersync/config.toml` or the platform equivalent), an
//! explicit `--config` file, `FOLDERSYNC_*` environment variables. CLI flags are
//! applied on top by the binary.

use crate::compare::CompareMode;
use crate::error::SyncError;
use crate::logging::LoggingConfig;
use crate::reconcile::{ErrorPolicy, ReconcileOptions};
use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `FOLDERSYNC_INTERVAL_SECS`
pub const ENV_PREFIX: &str = "FOLDERSYNC";

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds to sleep between passes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Change detection mode
    #[serde(default)]
    pub compare: CompareMode,

    /// Per-entry failure handling
    #[serde(default)]
    pub on_error: ErrorPolicy,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_interval_secs() -> u64 {
    60
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            compare: CompareMode::default(),
            on_error: ErrorPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.interval_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "Interval must be a positive number of seconds".to_string(),
            ));
        }
        self.logging.validate()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            compare: self.compare,
            on_error: self.on_error,
        }
    }
}

/// Loads [`SyncConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Path of the user-level config file, if a home directory can be resolved
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "foldersync").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the global file, an optional explicit file, and the environment
    pub fn load(explicit: Option<&Path>) -> Result<SyncConfig, SyncError> {
        Self::load_layers(Self::global_config_path().as_deref(), explicit)
    }

    /// Load configuration from a single file plus the environment
    pub fn load_from_file(path: &Path) -> Result<SyncConfig, SyncError> {
        Self::load_layers(None, Some(path))
    }

    /// Load from an optional global file and an optional explicit file
    ///
    /// A missing global file is skipped; a missing explicit file is an error.
    pub fn load_layers(
        global: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<SyncConfig, SyncError> {
        let mut builder = Config::builder();

        if let Some(global) = global {
            if global.exists() {
                builder = builder.add_source(
                    File::from(global)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(SyncError::InvalidConfig(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: SyncConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
