use cohort_stats_core::{LeveneCenter, Result};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use statrs::statistics::{Data, Median, Statistics};

use super::{ensure_finite, procedure_error};

/// k-sample Levene test. Returns `(W, p_value)` with W ~ F(k - 1, N - k) under H0.
pub fn levene(samples: &[&[f64]], center: LeveneCenter) -> Result<(f64, f64)> {
    let k = samples.len();
    if k < 2 {
        return Err(procedure_error(format!(
            "Levene needs at least two samples, got {}",
            k
        )));
    }
    for sample in samples {
        if sample.is_empty() {
            return Err(procedure_error("Levene received an empty sample"));
        }
        ensure_finite(sample, "Levene")?;
    }

    let total: usize = samples.iter().map(|s| s.len()).sum();
    if total <= k {
        return Err(procedure_error(format!(
            "Levene needs more observations ({}) than samples ({})",
            total, k
        )));
    }

    // Absolute deviations from each group's center
    let deviations: Vec<Vec<f64>> = samples
        .iter()
        .map(|sample| {
            let c = match center {
                LeveneCenter::Median => Data::new(sample.to_vec()).median(),
                LeveneCenter::Mean => sample.iter().mean(),
            };
            sample.iter().map(|x| (x - c).abs()).collect()
        })
        .collect();

    let group_means: Vec<f64> = deviations.iter().map(|z| z.iter().mean()).collect();
    let grand_mean =
        deviations.iter().flatten().sum::<f64>() / total as f64;

    let between: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zm)| z.len() as f64 * (zm - grand_mean).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zm)| z.iter().map(|v| (v - zm).powi(2)).sum::<f64>())
        .sum();

    if within <= 0.0 {
        return Err(procedure_error(
            "Levene is undefined when every sample has zero spread around its center",
        ));
    }

    let df_between = (k - 1) as f64;
    let df_within = (total - k) as f64;
    let w = (df_within / df_between) * (between / within);

    let f_dist = FisherSnedecor::new(df_between, df_within)
        .map_err(|e| procedure_error(e.to_string()))?;

    Ok((w, f_dist.sf(w)))
}
