//! CLI execution context

use anyhow::{Context as _, Result};
use cohort_stats_core::{FlatTable, TableSource, TestConfig};
use std::path::Path;

use crate::cli::{Cli, DataArgs};
use crate::config::AppConfig;
use crate::loader::CsvSource;
use crate::output::{OutputFormat, OutputWriter};

/// Execution context for CLI commands
pub struct Context {
    /// Loaded configuration, before per-command overrides
    pub config: AppConfig,

    /// Output writer
    pub output: OutputWriter,
}

impl Context {
    /// Create a new context from CLI arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = AppConfig::load(cli.config.as_deref())?;

        let output_format: OutputFormat = cli.output.unwrap_or(config.output.format);
        let output = OutputWriter::new(output_format, cli.no_color || !config.output.color);

        Ok(Self { config, output })
    }

    /// Test parameters with command-line overrides applied
    pub fn test_config(&self, args: &DataArgs) -> TestConfig {
        let mut config = self.config.test.clone();
        if let Some(ref feature) = args.feature {
            config.feature = feature.clone();
        }
        if let Some(alpha) = args.alpha {
            config.alpha = alpha;
        }
        if let Some(threshold) = args.threshold {
            config.threshold = threshold;
        }
        config
    }

    /// Index fields from the command line, or the configured ones
    pub fn index_fields(&self, args: &DataArgs) -> Vec<String> {
        if args.index.is_empty() {
            self.config.data.index.clone()
        } else {
            args.index.clone()
        }
    }

    pub fn time_column(&self, args: &DataArgs) -> String {
        args.time_column
            .clone()
            .unwrap_or_else(|| self.config.data.time_column.clone())
    }

    /// Load a CSV table with the configured delimiter
    pub fn load_table(&self, path: &Path) -> Result<FlatTable> {
        CsvSource::new(path)
            .with_delimiter(self.config.data.delimiter)
            .load()
            .with_context(|| format!("Failed to load table from {:?}", path))
    }
}
