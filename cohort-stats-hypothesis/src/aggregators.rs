use cohort_stats_core::{
    FlatTable, IndexKey, IndexedView, Label, Report, ReportKind, ReportRow, Result,
    StatisticalProcedures, TestConfig, TestResult, Value, HYPOTHESIS_COLUMN,
};

use crate::correction::Corrector;
use crate::drivers::TestDrivers;
use crate::procedures::StatrsProcedures;

/// Runs one driver over a list of time values or key pairs and corrects
/// every p-value with the size of that list.
///
/// Each call builds its own [`IndexedView`] and keeps no state between
/// calls, so independent reports can run on separate threads. A failing
/// comparison aborts the whole batch: no partial report is returned.
#[derive(Debug, Clone)]
pub struct BatchAggregator<P> {
    drivers: TestDrivers<P>,
}

impl BatchAggregator<StatrsProcedures> {
    pub fn with_config(config: TestConfig) -> Result<Self> {
        Self::new(StatrsProcedures, config)
    }
}

impl<P: StatisticalProcedures> BatchAggregator<P> {
    pub fn new(procedures: P, config: TestConfig) -> Result<Self> {
        Ok(Self {
            drivers: TestDrivers::new(procedures, config)?,
        })
    }

    pub fn drivers(&self) -> &TestDrivers<P> {
        &self.drivers
    }

    pub fn config(&self) -> &TestConfig {
        self.drivers.config()
    }

    /// Normality of `key`'s sample at each of `time_values`
    pub fn normality_report<S: AsRef<str>>(
        &self,
        table: &FlatTable,
        index_fields: &[S],
        key: &IndexKey,
        time_column: &str,
        time_values: &[Value],
    ) -> Result<Report> {
        let corrector = self.corrector(time_values.len())?;
        let view = IndexedView::build(table, index_fields)?;

        let results = time_values
            .iter()
            .map(|time_value| {
                let result = self.drivers.normality(&view, key, time_column, time_value)?;
                Ok((Label::Simple(time_value.clone()), result))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.assemble(ReportKind::Normality, time_column, &corrector, results))
    }

    /// Equality of variances across all `keys`, one row per time value
    pub fn variance_homogeneity_report<S: AsRef<str>>(
        &self,
        table: &FlatTable,
        index_fields: &[S],
        keys: &[IndexKey],
        time_column: &str,
        time_values: &[Value],
    ) -> Result<Report> {
        let corrector = self.corrector(time_values.len())?;
        let view = IndexedView::build(table, index_fields)?;

        let results = time_values
            .iter()
            .map(|time_value| {
                let result =
                    self.drivers
                        .variance_homogeneity(&view, keys, time_column, time_value)?;
                Ok((Label::Simple(time_value.clone()), result))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.assemble(
            ReportKind::VarianceHomogeneity,
            time_column,
            &corrector,
            results,
        ))
    }

    /// One-sided t-tests for each `(first, second)` pair at `time_value`
    pub fn t_test_report<S: AsRef<str>>(
        &self,
        table: &FlatTable,
        index_fields: &[S],
        pairs: &[(IndexKey, IndexKey)],
        time_column: &str,
        time_value: &Value,
    ) -> Result<Report> {
        self.pairwise_report(
            ReportKind::TTest,
            table,
            index_fields,
            pairs,
            |view, first, second| {
                self.drivers
                    .t_test(view, first, second, time_column, time_value)
            },
        )
    }

    /// One-sided Mann-Whitney U tests for each `(first, second)` pair at `time_value`
    pub fn mann_whitney_report<S: AsRef<str>>(
        &self,
        table: &FlatTable,
        index_fields: &[S],
        pairs: &[(IndexKey, IndexKey)],
        time_column: &str,
        time_value: &Value,
    ) -> Result<Report> {
        self.pairwise_report(
            ReportKind::MannWhitney,
            table,
            index_fields,
            pairs,
            |view, first, second| {
                self.drivers
                    .mann_whitney(view, first, second, time_column, time_value)
            },
        )
    }

    fn pairwise_report<S, F>(
        &self,
        kind: ReportKind,
        table: &FlatTable,
        index_fields: &[S],
        pairs: &[(IndexKey, IndexKey)],
        driver: F,
    ) -> Result<Report>
    where
        S: AsRef<str>,
        F: Fn(&IndexedView<'_>, &IndexKey, &IndexKey) -> Result<TestResult>,
    {
        let corrector = self.corrector(pairs.len())?;
        let view = IndexedView::build(table, index_fields)?;

        let results = pairs
            .iter()
            .map(|(first, second)| {
                let result = driver(&view, first, second)?;
                let label = Label::Pairwise {
                    first: first.clone(),
                    second: second.clone(),
                };
                Ok((label, result))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.assemble(kind, HYPOTHESIS_COLUMN, &corrector, results))
    }

    fn corrector(&self, n_hypotheses: usize) -> Result<Corrector> {
        let config = self.config();
        Corrector::new(config.correction, config.alpha, n_hypotheses)
    }

    fn assemble(
        &self,
        kind: ReportKind,
        label_column: &str,
        corrector: &Corrector,
        results: Vec<(Label, TestResult)>,
    ) -> Report {
        let rows: Vec<ReportRow> = results
            .into_iter()
            .map(|(label, result)| ReportRow {
                label,
                statistic: result.statistic,
                p_value: result.p_value,
                procedure: result.procedure,
                reject: corrector.reject(result.p_value),
            })
            .collect();

        tracing::info!(
            kind = ?kind,
            rows = rows.len(),
            n_hypotheses = corrector.n_hypotheses(),
            threshold = corrector.threshold(),
            rejected = rows.iter().filter(|r| r.reject).count(),
            "Report assembled"
        );

        Report {
            kind,
            feature: self.config().feature.clone(),
            label_column: label_column.to_string(),
            alpha: corrector.alpha(),
            correction: corrector.strategy(),
            n_hypotheses: corrector.n_hypotheses(),
            rows,
        }
    }
}
