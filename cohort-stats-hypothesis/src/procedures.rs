pub mod kolmogorov;
pub mod levene;
pub mod location;
pub mod shapiro;

use cohort_stats_core::{CoreError, LeveneCenter, Result, StatisticalProcedures};
use statrs::distribution::Normal;

/// [`StatisticalProcedures`] backed by `statrs` distributions
#[derive(Debug, Clone, Copy, Default)]
pub struct StatrsProcedures;

impl StatrsProcedures {
    pub fn new() -> Self {
        Self
    }
}

impl StatisticalProcedures for StatrsProcedures {
    fn shapiro_wilk(&self, sample: &[f64]) -> Result<(f64, f64)> {
        shapiro::shapiro_wilk(sample)
    }

    fn kolmogorov_smirnov_normal(&self, sample: &[f64], mean: f64, std_dev: f64)
        -> Result<(f64, f64)> {
        kolmogorov::ks_test_normal(sample, mean, std_dev)
    }

    fn levene(&self, samples: &[Vec<f64>], center: LeveneCenter) -> Result<(f64, f64)> {
        let refs: Vec<&[f64]> = samples.iter().map(Vec::as_slice).collect();
        levene::levene(&refs, center)
    }

    fn t_test_greater(&self, first: &[f64], second: &[f64], equal_variance: bool)
        -> Result<(f64, f64)> {
        location::t_test_greater(first, second, equal_variance)
    }

    fn mann_whitney_greater(&self, first: &[f64], second: &[f64]) -> Result<(f64, f64)> {
        location::mann_whitney_greater(first, second)
    }
}

pub(crate) fn procedure_error(message: impl Into<String>) -> CoreError {
    CoreError::StatisticalProcedure(message.into())
}

pub(crate) fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| procedure_error(e.to_string()))
}

pub(crate) fn ensure_finite(sample: &[f64], procedure: &str) -> Result<()> {
    if sample.iter().any(|v| !v.is_finite()) {
        return Err(procedure_error(format!(
            "{} requires finite observations",
            procedure
        )));
    }
    Ok(())
}

/// Sorted copy of a finite sample
pub(crate) fn sorted(sample: &[f64]) -> Vec<f64> {
    let mut values = sample.to_vec();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}
