use cohort_stats_core::{
    CoreError, IndexKey, IndexedView, Procedure, Result, StatisticalProcedures, TestConfig,
    TestResult, Value,
};
use statrs::statistics::Statistics;

/// The four single-comparison tests.
///
/// Each call selects its sample(s) from an [`IndexedView`] by index key and
/// time value, hands them to the [`StatisticalProcedures`] collaborator and
/// returns the outcome rounded to three decimals.
#[derive(Debug, Clone)]
pub struct TestDrivers<P> {
    procedures: P,
    config: TestConfig,
}

impl<P: StatisticalProcedures> TestDrivers<P> {
    pub fn new(procedures: P, config: TestConfig) -> Result<Self> {
        Ok(Self {
            procedures,
            config: config.validated()?,
        })
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    pub fn procedures(&self) -> &P {
        &self.procedures
    }

    /// Normality of one key's sample at one time value.
    ///
    /// Samples no larger than `config.threshold` go to Shapiro-Wilk, larger
    /// ones to Kolmogorov-Smirnov against a normal distribution whose mean
    /// and (population) standard deviation are estimated from the same
    /// sample. Estimating the reference from the data makes that p-value
    /// conservative (biased toward not rejecting); no Lilliefors
    /// correction is applied.
    pub fn normality(
        &self,
        view: &IndexedView<'_>,
        key: &IndexKey,
        time_column: &str,
        time_value: &Value,
    ) -> Result<TestResult> {
        let sample = view.sample(key, time_column, time_value, &self.config.feature)?;

        if sample.len() <= self.config.threshold {
            tracing::debug!(
                key = %key,
                time = %time_value,
                n = sample.len(),
                "Running Shapiro-Wilk"
            );
            let (statistic, p_value) = self.procedures.shapiro_wilk(&sample)?;
            finish(statistic, p_value, Procedure::ShapiroWilk)
        } else {
            let mean = sample.iter().mean();
            let std_dev = sample.iter().population_std_dev();
            tracing::debug!(
                key = %key,
                time = %time_value,
                n = sample.len(),
                mean,
                std_dev,
                "Running Kolmogorov-Smirnov against sample-estimated normal"
            );
            let (statistic, p_value) =
                self.procedures
                    .kolmogorov_smirnov_normal(&sample, mean, std_dev)?;
            finish(statistic, p_value, Procedure::KolmogorovSmirnov)
        }
    }

    /// Levene test across all `keys` at once (not pairwise)
    pub fn variance_homogeneity(
        &self,
        view: &IndexedView<'_>,
        keys: &[IndexKey],
        time_column: &str,
        time_value: &Value,
    ) -> Result<TestResult> {
        if keys.len() < 2 {
            return Err(CoreError::InsufficientData(format!(
                "variance homogeneity needs at least two keys, got {}",
                keys.len()
            )));
        }

        let samples = keys
            .iter()
            .map(|key| view.sample(key, time_column, time_value, &self.config.feature))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            keys = keys.len(),
            time = %time_value,
            center = ?self.config.levene_center,
            "Running Levene"
        );
        let (statistic, p_value) = self.procedures.levene(&samples, self.config.levene_center)?;
        finish(statistic, p_value, Procedure::Levene)
    }

    /// One-sided t-test, H1: mean(first) > mean(second).
    ///
    /// Swapping the keys tests the opposite hypothesis.
    pub fn t_test(
        &self,
        view: &IndexedView<'_>,
        first: &IndexKey,
        second: &IndexKey,
        time_column: &str,
        time_value: &Value,
    ) -> Result<TestResult> {
        let (a, b) = self.pair(view, first, second, time_column, time_value)?;
        let procedure = if self.config.equal_variance {
            Procedure::StudentT
        } else {
            Procedure::WelchT
        };

        tracing::debug!(
            first = %first,
            second = %second,
            time = %time_value,
            n1 = a.len(),
            n2 = b.len(),
            procedure = procedure.name(),
            "Running t-test"
        );
        let (statistic, p_value) =
            self.procedures
                .t_test_greater(&a, &b, self.config.equal_variance)?;
        finish(statistic, p_value, procedure)
    }

    /// One-sided Mann-Whitney U test, H1: first is stochastically greater.
    ///
    /// Swapping the keys tests the opposite hypothesis.
    pub fn mann_whitney(
        &self,
        view: &IndexedView<'_>,
        first: &IndexKey,
        second: &IndexKey,
        time_column: &str,
        time_value: &Value,
    ) -> Result<TestResult> {
        let (a, b) = self.pair(view, first, second, time_column, time_value)?;

        tracing::debug!(
            first = %first,
            second = %second,
            time = %time_value,
            n1 = a.len(),
            n2 = b.len(),
            "Running Mann-Whitney U"
        );
        let (statistic, p_value) = self.procedures.mann_whitney_greater(&a, &b)?;
        finish(statistic, p_value, Procedure::MannWhitneyU)
    }

    fn pair(
        &self,
        view: &IndexedView<'_>,
        first: &IndexKey,
        second: &IndexKey,
        time_column: &str,
        time_value: &Value,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        let feature = &self.config.feature;
        Ok((
            view.sample(first, time_column, time_value, feature)?,
            view.sample(second, time_column, time_value, feature)?,
        ))
    }
}

fn finish(statistic: f64, p_value: f64, procedure: Procedure) -> Result<TestResult> {
    if !statistic.is_finite() || !p_value.is_finite() {
        return Err(CoreError::StatisticalProcedure(format!(
            "{} returned a non-finite result (statistic = {}, p = {})",
            procedure.name(),
            statistic,
            p_value
        )));
    }
    Ok(TestResult::rounded(statistic, p_value, procedure))
}
