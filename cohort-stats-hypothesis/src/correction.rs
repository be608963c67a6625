use cohort_stats_core::{CoreError, CorrectionStrategy, Result};
use serde::{Deserialize, Serialize};

/// Reject/retain decisions for one hypothesis batch.
///
/// The per-test threshold is `alpha / n_hypotheses`. `n_hypotheses` has to
/// equal the number of comparisons in the batch for the family-wise error
/// rate to hold; nothing here can check that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corrector {
    strategy: CorrectionStrategy,
    alpha: f64,
    n_hypotheses: usize,
}

impl Corrector {
    /// Fails with `CoreError::Division` when `n_hypotheses` is zero
    pub fn new(strategy: CorrectionStrategy, alpha: f64, n_hypotheses: usize) -> Result<Self> {
        if n_hypotheses == 0 {
            return Err(CoreError::Division(format!(
                "cannot split alpha = {} across zero hypotheses",
                alpha
            )));
        }
        Ok(Self {
            strategy,
            alpha,
            n_hypotheses,
        })
    }

    pub fn bonferroni(alpha: f64, n_hypotheses: usize) -> Result<Self> {
        Self::new(CorrectionStrategy::Bonferroni, alpha, n_hypotheses)
    }

    pub fn strategy(&self) -> CorrectionStrategy {
        self.strategy
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn n_hypotheses(&self) -> usize {
        self.n_hypotheses
    }

    /// Per-test significance level
    pub fn threshold(&self) -> f64 {
        match self.strategy {
            CorrectionStrategy::Bonferroni => self.alpha / self.n_hypotheses as f64,
        }
    }

    pub fn reject(&self, p_value: f64) -> bool {
        p_value < self.threshold()
    }
}

/// One-off Bonferroni decision: true iff `p_value < alpha / n_hypotheses`
pub fn reject(p_value: f64, alpha: f64, n_hypotheses: usize) -> Result<bool> {
    Ok(Corrector::bonferroni(alpha, n_hypotheses)?.reject(p_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_shrinks_with_batch_size() {
        let single = Corrector::bonferroni(0.05, 1).unwrap();
        let family = Corrector::bonferroni(0.05, 5).unwrap();
        assert_eq!(single.threshold(), 0.05);
        assert!((family.threshold() - 0.01).abs() < 1e-15);
    }

    #[test]
    fn test_zero_hypotheses_is_division_error() {
        let err = reject(0.001, 0.05, 0).unwrap_err();
        assert!(matches!(err, CoreError::Division(_)));
    }
}
