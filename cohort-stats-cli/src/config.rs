//! CLI configuration management

use anyhow::{Context as _, Result};
use cohort_stats_core::TestConfig;
use config::{Config as ConfigLoader, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Environment prefix, e.g. `COHORT_STATS__TEST__ALPHA=0.01`
pub const ENV_PREFIX: &str = "COHORT_STATS";

/// Default time column
pub const DEFAULT_TIME_COLUMN: &str = "Year";

/// Effective configuration of one CLI invocation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Parameters handed to the drivers and aggregators
    pub test: TestConfig,

    /// How input tables are read and keyed
    pub data: DataSettings,

    /// Rendering settings
    pub output: OutputSettings,
}

impl AppConfig {
    /// Layer `config/default`, `config/local`, the per-user config file,
    /// an explicit file and `COHORT_STATS__*` environment variables, in
    /// increasing precedence.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = Self::user_config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        let loaded = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        let config: AppConfig = loaded
            .try_deserialize()
            .context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Per-user configuration file, if a home directory can be determined
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "cohort-stats", "cohort-stats")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Input table settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataSettings {
    /// Index fields used when a command names none
    pub index: Vec<String>,

    /// Column holding the time value
    pub time_column: String,

    /// Field delimiter of CSV input
    pub delimiter: char,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            index: vec!["Status".to_string()],
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            delimiter: ',',
        }
    }
}

/// Rendering settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    /// Default output format
    pub format: OutputFormat,

    /// Enable colored output
    pub color: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            color: true,
        }
    }
}
