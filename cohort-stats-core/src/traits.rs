use crate::domain::{FlatTable, LeveneCenter};
use crate::error::Result;

/// Numerical primitives the test drivers delegate to.
///
/// Every method returns the raw, unrounded `(statistic, p_value)` pair.
/// Implementations reject inputs they cannot handle with
/// `CoreError::StatisticalProcedure` instead of producing NaN.
pub trait StatisticalProcedures {
    /// Shapiro-Wilk W test for normality
    fn shapiro_wilk(&self, sample: &[f64]) -> Result<(f64, f64)>;

    /// Two-sided one-sample Kolmogorov-Smirnov test against N(mean, std_dev)
    fn kolmogorov_smirnov_normal(&self, sample: &[f64], mean: f64, std_dev: f64)
        -> Result<(f64, f64)>;

    /// k-sample Levene test for equal variances
    fn levene(&self, samples: &[Vec<f64>], center: LeveneCenter) -> Result<(f64, f64)>;

    /// Independent two-sample t-test, alternative: mean(first) > mean(second)
    fn t_test_greater(&self, first: &[f64], second: &[f64], equal_variance: bool)
        -> Result<(f64, f64)>;

    /// Mann-Whitney U test, alternative: first is stochastically greater than second
    fn mann_whitney_greater(&self, first: &[f64], second: &[f64]) -> Result<(f64, f64)>;
}

impl<T: StatisticalProcedures + ?Sized> StatisticalProcedures for &T {
    fn shapiro_wilk(&self, sample: &[f64]) -> Result<(f64, f64)> {
        (**self).shapiro_wilk(sample)
    }

    fn kolmogorov_smirnov_normal(&self, sample: &[f64], mean: f64, std_dev: f64)
        -> Result<(f64, f64)> {
        (**self).kolmogorov_smirnov_normal(sample, mean, std_dev)
    }

    fn levene(&self, samples: &[Vec<f64>], center: LeveneCenter) -> Result<(f64, f64)> {
        (**self).levene(samples, center)
    }

    fn t_test_greater(&self, first: &[f64], second: &[f64], equal_variance: bool)
        -> Result<(f64, f64)> {
        (**self).t_test_greater(first, second, equal_variance)
    }

    fn mann_whitney_greater(&self, first: &[f64], second: &[f64]) -> Result<(f64, f64)> {
        (**self).mann_whitney_greater(first, second)
    }
}

/// Supplier of flat tables (files, databases, fixtures)
pub trait TableSource {
    fn load(&self) -> Result<FlatTable>;
}
