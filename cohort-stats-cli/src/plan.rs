//! Batch plans: several reports over one table
//!
//! Each report runs on its own blocking worker. Reports share the table
//! read-only and never share aggregator state; results are returned in
//! plan order.

use anyhow::{anyhow, Context as _, Result};
use cohort_stats_core::{FlatTable, IndexKey, Report, TestConfig, Value};
use cohort_stats_hypothesis::BatchAggregator;
use futures::stream::{FuturesOrdered, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Plan file contents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// CSV input; relative paths resolve against the plan file
    pub data: PathBuf,

    /// Index fields; the configured ones when absent
    #[serde(default)]
    pub index: Option<Vec<String>>,

    /// Time column; the configured one when absent
    #[serde(default)]
    pub time_column: Option<String>,

    #[serde(default, rename = "report")]
    pub reports: Vec<PlanEntry>,
}

/// One report of a plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanEntry {
    /// Feature override for this report
    #[serde(default)]
    pub feature: Option<String>,

    /// Alpha override for this report
    #[serde(default)]
    pub alpha: Option<f64>,

    #[serde(flatten)]
    pub test: PlannedTest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum PlannedTest {
    Normality {
        key: IndexKey,
        time_values: Vec<Value>,
    },
    VarianceHomogeneity {
        keys: Vec<IndexKey>,
        time_values: Vec<Value>,
    },
    TTest {
        pairs: Vec<(IndexKey, IndexKey)>,
        time_value: Value,
    },
    MannWhitney {
        pairs: Vec<(IndexKey, IndexKey)>,
        time_value: Value,
    },
}

impl Plan {
    /// Read a TOML plan, or a JSON plan when the extension is `.json`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan from {:?}", path))?;

        let mut plan: Plan = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse plan from {:?}", path))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Failed to parse plan from {:?}", path))?,
        };

        if plan.data.is_relative() {
            if let Some(dir) = path.parent() {
                plan.data = dir.join(&plan.data);
            }
        }
        Ok(plan)
    }
}

impl PlanEntry {
    fn config(&self, base: &TestConfig) -> TestConfig {
        let mut config = base.clone();
        if let Some(ref feature) = self.feature {
            config.feature = feature.clone();
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        config
    }

    /// Run this entry to completion on the calling thread
    pub fn run(
        &self,
        base: &TestConfig,
        table: &FlatTable,
        index: &[String],
        time_column: &str,
    ) -> cohort_stats_core::Result<Report> {
        let aggregator = BatchAggregator::with_config(self.config(base))?;
        match &self.test {
            PlannedTest::Normality { key, time_values } => {
                aggregator.normality_report(table, index, key, time_column, time_values)
            }
            PlannedTest::VarianceHomogeneity { keys, time_values } => aggregator
                .variance_homogeneity_report(table, index, keys, time_column, time_values),
            PlannedTest::TTest { pairs, time_value } => {
                aggregator.t_test_report(table, index, pairs, time_column, time_value)
            }
            PlannedTest::MannWhitney { pairs, time_value } => {
                aggregator.mann_whitney_report(table, index, pairs, time_column, time_value)
            }
        }
    }
}

/// Run every entry on its own blocking worker and collect the reports in
/// plan order. The first failing entry fails the whole plan.
pub async fn run_plan(
    entries: Vec<PlanEntry>,
    base: TestConfig,
    table: Arc<FlatTable>,
    index: Arc<Vec<String>>,
    time_column: Arc<str>,
    progress: Option<indicatif::ProgressBar>,
) -> Result<Vec<Report>> {
    let mut workers = FuturesOrdered::new();
    for (position, entry) in entries.into_iter().enumerate() {
        let base = base.clone();
        let table = Arc::clone(&table);
        let index = Arc::clone(&index);
        let time_column = Arc::clone(&time_column);
        workers.push_back(tokio::task::spawn_blocking(move || {
            tracing::debug!(position, test = ?entry.test, "Running plan entry");
            let result = entry.run(&base, &table, &index, &time_column);
            (position, result)
        }));
    }

    let mut reports = Vec::with_capacity(workers.len());
    while let Some(joined) = workers.next().await {
        let (position, result) = joined.map_err(|e| anyhow!("Plan worker panicked: {}", e))?;
        let report = result.with_context(|| format!("Plan entry {} failed", position + 1))?;
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
        reports.push(report);
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_stats_core::ReportKind;
    use pretty_assertions::assert_eq;

    const PLAN: &str = r#"
data = "life.csv"
index = ["Status"]

[[report]]
test = "normality"
key = "Developed"
time_values = [2000, 2001]

[[report]]
test = "mann_whitney"
feature = "GDP"
pairs = [["Developed", "Developing"]]
time_value = 2001
"#;

    fn table() -> FlatTable {
        let mut table = FlatTable::new(vec!["Status", "Year", "Life_expectancy", "GDP"]).unwrap();
        for (status, offset) in [("Developed", 10.0), ("Developing", 0.0)] {
            for year in [2000i64, 2001] {
                for i in 0..5 {
                    let x = offset + i as f64 + (year - 2000) as f64 * 0.5;
                    table
                        .push_row(vec![
                            Value::from(status),
                            Value::from(year),
                            Value::from(60.0 + x),
                            Value::from(x * 100.0),
                        ])
                        .unwrap();
                }
            }
        }
        table
    }

    #[test]
    fn test_parse_toml_plan() {
        let plan: Plan = toml::from_str(PLAN).unwrap();

        assert_eq!(plan.data, PathBuf::from("life.csv"));
        assert_eq!(plan.reports.len(), 2);
        assert_eq!(
            plan.reports[0].test,
            PlannedTest::Normality {
                key: IndexKey::from("Developed"),
                time_values: vec![Value::Integer(2000), Value::Integer(2001)],
            }
        );
        assert_eq!(plan.reports[1].feature.as_deref(), Some("GDP"));
    }

    #[tokio::test]
    async fn test_run_plan_keeps_order() {
        let plan: Plan = toml::from_str(PLAN).unwrap();
        let reports = run_plan(
            plan.reports,
            TestConfig::default(),
            Arc::new(table()),
            Arc::new(vec!["Status".to_string()]),
            Arc::from("Year"),
            None,
        )
        .await
        .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].kind, ReportKind::Normality);
        assert_eq!(reports[0].n_hypotheses, 2);
        assert_eq!(reports[1].kind, ReportKind::MannWhitney);
        assert_eq!(reports[1].feature, "GDP");
        assert_eq!(reports[1].rows[0].statistic, 25.0);
        assert!(reports[1].rows[0].reject);
    }

    #[tokio::test]
    async fn test_failing_entry_fails_plan() {
        let entry = PlanEntry {
            feature: None,
            alpha: None,
            test: PlannedTest::TTest {
                pairs: vec![(IndexKey::from("Developed"), IndexKey::from("Unknown"))],
                time_value: Value::Integer(2000),
            },
        };

        let err = run_plan(
            vec![entry],
            TestConfig::default(),
            Arc::new(table()),
            Arc::new(vec!["Status".to_string()]),
            Arc::from("Year"),
            None,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Plan entry 1 failed"));
    }
}
