//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{HomogeneityArgs, NormalityArgs, PairwiseArgs, PlanArgs};
use crate::output::OutputFormat;

/// Batch hypothesis tests over cohort tables
#[derive(Debug, Parser)]
#[command(name = "cohort-stats", version, about, long_about = None)]
pub struct Cli {
    /// Output format (overrides the configured one)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Additional configuration file
    #[arg(short, long, global = true, env = "COHORT_STATS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normality of one key's sample at each time value
    Normality(NormalityArgs),

    /// Equality of variances across keys at each time value
    Homogeneity(HomogeneityArgs),

    /// One-sided t-tests for ordered key pairs
    TTest(PairwiseArgs),

    /// One-sided Mann-Whitney U tests for ordered key pairs
    MannWhitney(PairwiseArgs),

    /// Run every report listed in a plan file
    Plan(PlanArgs),

    /// Print the effective configuration
    Config,
}

/// Input table and per-run overrides shared by the test commands
#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// CSV file with a header row
    #[arg(short, long)]
    pub data: PathBuf,

    /// Index fields, comma-separated (e.g. Status,Country)
    #[arg(short, long, value_delimiter = ',')]
    pub index: Vec<String>,

    /// Column holding the time value
    #[arg(short, long)]
    pub time_column: Option<String>,

    /// Numeric column under test
    #[arg(short, long)]
    pub feature: Option<String>,

    /// Family-wise significance level
    #[arg(short, long)]
    pub alpha: Option<f64>,

    /// Largest sample size tested with Shapiro-Wilk
    #[arg(long)]
    pub threshold: Option<usize>,
}
