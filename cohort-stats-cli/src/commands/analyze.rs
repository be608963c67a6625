//! Single-report commands

use anyhow::{Context as _, Result};
use clap::Args;
use cohort_stats_core::{IndexKey, Report, Value};
use cohort_stats_hypothesis::{BatchAggregator, StatrsProcedures};

use super::{parse_key, parse_pair};
use crate::cli::DataArgs;
use crate::context::Context;

#[derive(Debug, Args)]
pub struct NormalityArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Key whose sample is tested (comma-separated for composite keys)
    #[arg(short, long)]
    pub key: String,

    /// Time values, one report row each
    #[arg(short = 'y', long = "time-values", value_delimiter = ',', required = true)]
    pub time_values: Vec<String>,
}

#[derive(Debug, Args)]
pub struct HomogeneityArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Keys compared jointly (repeat the flag, at least two)
    #[arg(short, long = "key", required = true, num_args = 1)]
    pub keys: Vec<String>,

    /// Time values, one report row each
    #[arg(short = 'y', long = "time-values", value_delimiter = ',', required = true)]
    pub time_values: Vec<String>,
}

#[derive(Debug, Args)]
pub struct PairwiseArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Ordered pair FIRST:SECOND testing H0 "FIRST <= SECOND" (repeatable)
    #[arg(short, long = "pair", required = true, num_args = 1)]
    pub pairs: Vec<String>,

    /// Time value all pairs are compared at
    #[arg(short = 'y', long)]
    pub time_value: String,
}

fn aggregator(ctx: &Context, data: &DataArgs) -> Result<BatchAggregator<StatrsProcedures>> {
    BatchAggregator::with_config(ctx.test_config(data)).context("Invalid test configuration")
}

fn time_values(raw: &[String]) -> Vec<Value> {
    raw.iter().map(|v| Value::parse(v)).collect()
}

pub async fn normality(ctx: &Context, args: NormalityArgs) -> Result<()> {
    let table = ctx.load_table(&args.data.data)?;
    let key = parse_key(&args.key)?;

    let report = aggregator(ctx, &args.data)?
        .normality_report(
            &table,
            &ctx.index_fields(&args.data),
            &key,
            &ctx.time_column(&args.data),
            &time_values(&args.time_values),
        )
        .with_context(|| format!("Normality report for {} failed", key))?;

    finish(ctx, &report)
}

pub async fn homogeneity(ctx: &Context, args: HomogeneityArgs) -> Result<()> {
    let table = ctx.load_table(&args.data.data)?;
    let keys = args
        .keys
        .iter()
        .map(|k| parse_key(k))
        .collect::<Result<Vec<_>>>()?;

    let report = aggregator(ctx, &args.data)?
        .variance_homogeneity_report(
            &table,
            &ctx.index_fields(&args.data),
            &keys,
            &ctx.time_column(&args.data),
            &time_values(&args.time_values),
        )
        .context("Variance homogeneity report failed")?;

    finish(ctx, &report)
}

pub async fn t_test(ctx: &Context, args: PairwiseArgs) -> Result<()> {
    let table = ctx.load_table(&args.data.data)?;
    let pairs = parse_pairs(&args.pairs)?;

    let report = aggregator(ctx, &args.data)?
        .t_test_report(
            &table,
            &ctx.index_fields(&args.data),
            &pairs,
            &ctx.time_column(&args.data),
            &Value::parse(&args.time_value),
        )
        .context("t-test report failed")?;

    finish(ctx, &report)
}

pub async fn mann_whitney(ctx: &Context, args: PairwiseArgs) -> Result<()> {
    let table = ctx.load_table(&args.data.data)?;
    let pairs = parse_pairs(&args.pairs)?;

    let report = aggregator(ctx, &args.data)?
        .mann_whitney_report(
            &table,
            &ctx.index_fields(&args.data),
            &pairs,
            &ctx.time_column(&args.data),
            &Value::parse(&args.time_value),
        )
        .context("Mann-Whitney report failed")?;

    finish(ctx, &report)
}

fn parse_pairs(raw: &[String]) -> Result<Vec<(IndexKey, IndexKey)>> {
    raw.iter().map(|p| parse_pair(p)).collect()
}

fn finish(ctx: &Context, report: &Report) -> Result<()> {
    ctx.output.write_report(report)
}
