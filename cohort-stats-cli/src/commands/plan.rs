//! Plan command

use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use crate::context::Context;
use crate::plan::{run_plan, Plan};

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Plan file (TOML, or JSON with a .json extension)
    pub plan: PathBuf,

    /// CSV input overriding the plan's `data` entry
    #[arg(short, long)]
    pub data: Option<PathBuf>,
}

pub async fn execute(ctx: &Context, args: PlanArgs) -> Result<()> {
    let plan = Plan::load(&args.plan)?;
    if plan.reports.is_empty() {
        return Err(anyhow!("Plan {:?} lists no reports", args.plan));
    }

    let data = args.data.unwrap_or(plan.data);
    let table = ctx.load_table(&data)?;
    let index = plan.index.unwrap_or_else(|| ctx.config.data.index.clone());
    let time_column = plan
        .time_column
        .unwrap_or_else(|| ctx.config.data.time_column.clone());

    ctx.output.info(&format!(
        "Running {} report(s) over {} record(s)",
        plan.reports.len(),
        table.len()
    ));
    let progress = ctx
        .output
        .progress_bar(plan.reports.len() as u64, "reports");

    let reports = run_plan(
        plan.reports,
        ctx.config.test.clone(),
        Arc::new(table),
        Arc::new(index),
        Arc::from(time_column),
        progress,
    )
    .await?;

    ctx.output.write_reports(&reports)
}
