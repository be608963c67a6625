use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;

pub const DEFAULT_THRESHOLD: usize = 30;
pub const DEFAULT_ALPHA: f64 = 0.05;
pub const DEFAULT_FEATURE: &str = "Life_expectancy";

// ===== Correction Strategy =====

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionStrategy {
    /// Per-test level alpha / n_hypotheses
    #[default]
    Bonferroni,
}

// ===== Levene Centering =====

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LeveneCenter {
    /// Brown-Forsythe variant, robust to non-normal data
    #[default]
    Median,
    /// Levene's original formulation
    Mean,
}

// ===== Test Configuration =====

/// Parameters shared by every driver and aggregator call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct TestConfig {
    /// Largest sample size still tested with Shapiro-Wilk
    #[validate(range(min = 3))]
    pub threshold: usize,
    /// Family-wise significance level
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub alpha: f64,
    /// Numeric column under test
    #[validate(length(min = 1, max = 255))]
    pub feature: String,
    pub correction: CorrectionStrategy,
    pub levene_center: LeveneCenter,
    /// Pooled-variance t-test when true, Welch's t-test otherwise
    pub equal_variance: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            alpha: DEFAULT_ALPHA,
            feature: DEFAULT_FEATURE.to_string(),
            correction: CorrectionStrategy::Bonferroni,
            levene_center: LeveneCenter::Median,
            equal_variance: true,
        }
    }
}

impl TestConfig {
    pub fn new(feature: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_levene_center(mut self, center: LeveneCenter) -> Self {
        self.levene_center = center;
        self
    }

    pub fn with_equal_variance(mut self, equal_variance: bool) -> Self {
        self.equal_variance = equal_variance;
        self
    }

    /// Validate, converting failures into `CoreError::Validation`
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}
