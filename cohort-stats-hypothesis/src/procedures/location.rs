use cohort_stats_core::Result;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

use super::{ensure_finite, procedure_error, standard_normal};

/// Below this size (for either sample, with no ties) the exact null
/// distribution of U is used
const MANN_WHITNEY_EXACT_LIMIT: usize = 8;

/// Largest U range tabulated exactly; keeps every count inside `i128`
const MANN_WHITNEY_EXACT_MAX_U: usize = 1 << 20;

/// Independent two-sample t-test with alternative mean(first) > mean(second).
///
/// Pooled variance when `equal_variance`, Welch-Satterthwaite otherwise.
/// Returns `(t, p_value)`.
pub fn t_test_greater(first: &[f64], second: &[f64], equal_variance: bool) -> Result<(f64, f64)> {
    ensure_finite(first, "t-test")?;
    ensure_finite(second, "t-test")?;

    let n1 = first.len() as f64;
    let n2 = second.len() as f64;
    if first.is_empty() || second.is_empty() {
        return Err(procedure_error("t-test received an empty sample"));
    }

    let mean1 = first.iter().mean();
    let mean2 = second.iter().mean();
    let ss1: f64 = first.iter().map(|x| (x - mean1).powi(2)).sum();
    let ss2: f64 = second.iter().map(|x| (x - mean2).powi(2)).sum();

    let (std_err, df) = if equal_variance {
        let df = n1 + n2 - 2.0;
        if df < 1.0 {
            return Err(procedure_error(
                "pooled t-test needs at least three observations in total",
            ));
        }
        let pooled_var = (ss1 + ss2) / df;
        ((pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
    } else {
        if first.len() < 2 || second.len() < 2 {
            return Err(procedure_error(
                "Welch t-test needs at least two observations per sample",
            ));
        }
        let v1 = ss1 / (n1 - 1.0) / n1;
        let v2 = ss2 / (n2 - 1.0) / n2;
        let df = (v1 + v2).powi(2) / (v1.powi(2) / (n1 - 1.0) + v2.powi(2) / (n2 - 1.0));
        ((v1 + v2).sqrt(), df)
    };

    if !(std_err > 0.0) || !df.is_finite() {
        return Err(procedure_error(
            "t-test is undefined when both samples have zero variance",
        ));
    }

    let t_stat = (mean1 - mean2) / std_err;
    let t_dist = StudentsT::new(0.0, 1.0, df).map_err(|e| procedure_error(e.to_string()))?;

    Ok((t_stat, t_dist.sf(t_stat)))
}

/// Mann-Whitney U test with alternative "first is stochastically greater".
///
/// Returns `(U1, p_value)` where U1 counts pairs in which the first
/// sample's observation is larger (ties count one half). Small samples
/// without ties use the exact null distribution, everything else the
/// normal approximation with tie and continuity correction. A small
/// sample against a very large one is also approximated.
pub fn mann_whitney_greater(first: &[f64], second: &[f64]) -> Result<(f64, f64)> {
    if first.is_empty() || second.is_empty() {
        return Err(procedure_error("Mann-Whitney U received an empty sample"));
    }
    ensure_finite(first, "Mann-Whitney U")?;
    ensure_finite(second, "Mann-Whitney U")?;

    let n1 = first.len();
    let n2 = second.len();

    // Combine and rank all values
    let mut combined: Vec<(f64, bool)> = first
        .iter()
        .map(|&x| (x, true))
        .chain(second.iter().map(|&x| (x, false)))
        .collect();
    combined.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Assign ranks (handling ties)
    let mut rank_sum1 = 0.0;
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < combined.len() {
        let mut j = i;
        while j < combined.len() && combined[j].0 == combined[i].0 {
            j += 1;
        }
        let rank = (i + j + 1) as f64 / 2.0;
        rank_sum1 += rank * combined[i..j].iter().filter(|(_, in_first)| *in_first).count() as f64;
        let t = (j - i) as f64;
        tie_term += t * t * t - t;
        i = j;
    }

    let u1 = rank_sum1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let has_ties = tie_term > 0.0;

    let exact = if n1.min(n2) <= MANN_WHITNEY_EXACT_LIMIT
        && n1.saturating_mul(n2) <= MANN_WHITNEY_EXACT_MAX_U
        && !has_ties
    {
        exact_sf(u1.round() as usize, n1, n2)
    } else {
        None
    };
    let p_value = match exact {
        Some(p) => p,
        None => normal_sf(u1, n1, n2, tie_term)?,
    };

    Ok((u1, p_value.clamp(0.0, 1.0)))
}

/// P(U >= u) from the normal approximation with tie and continuity
/// correction
fn normal_sf(u: f64, n1: usize, n2: usize, tie_term: f64) -> Result<f64> {
    let n = (n1 + n2) as f64;
    let mean_u = (n1 * n2) as f64 / 2.0;
    let var_u = (n1 * n2) as f64 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if !(var_u > 0.0) {
        return Err(procedure_error(
            "Mann-Whitney U is undefined when all observations are tied",
        ));
    }
    let z = (u - mean_u - 0.5) / var_u.sqrt();
    Ok(standard_normal()?.sf(z))
}

/// P(U >= u) under H0 for sample sizes n1, n2 without ties.
///
/// `None` when the number of orderings does not fit in an `i128`.
fn exact_sf(u: usize, n1: usize, n2: usize) -> Option<f64> {
    let counts = null_counts(n1.min(n2), n1.max(n2))?;
    let total = counts.iter().try_fold(0i128, |acc, c| acc.checked_add(*c))?;
    let upper = counts
        .iter()
        .skip(u)
        .try_fold(0i128, |acc, c| acc.checked_add(*c))?;
    Some(upper as f64 / total as f64)
}

/// Number of orderings producing each U value: the coefficients of the
/// Gaussian binomial [m + n choose m]_q
fn null_counts(m: usize, n: usize) -> Option<Vec<i128>> {
    let max_u = m * n;
    let mut counts = vec![0i128; max_u + 1];
    counts[0] = 1;
    for i in 1..=m {
        let shift = n + i;
        for k in (shift..=max_u).rev() {
            counts[k] = counts[k].checked_sub(counts[k - shift])?;
        }
        for k in i..=max_u {
            counts[k] = counts[k].checked_add(counts[k - i])?;
        }
    }
    Some(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_counts_sum_to_binomial() {
        let counts = null_counts(3, 4).unwrap();
        assert_eq!(counts.len(), 13);
        assert_eq!(counts.iter().sum::<i128>(), 35);
        // symmetric around m * n / 2
        for u in 0..=12 {
            assert_eq!(counts[u], counts[12 - u]);
        }
        assert_eq!(counts[0], 1);
        assert_eq!(counts[1], 1);
        assert_eq!(counts[2], 2);
    }

    #[test]
    fn test_exact_sf_without_room_in_i128() {
        // C(1008, 8)
        let counts = null_counts(8, 1_000).unwrap();
        assert_eq!(counts.iter().sum::<i128>(), 25_708_099_169_553_626_826_i128);
        assert!(exact_sf(4_000, 8, 1_000).is_some());

        // C(300008, 8) exceeds i128::MAX
        assert!(exact_sf(36, 8, 300_000).is_none());
    }

    #[test]
    fn test_exact_sf_extremes() {
        assert_relative_eq!(exact_sf(0, 5, 5).unwrap(), 1.0);
        assert_relative_eq!(exact_sf(25, 5, 5).unwrap(), 1.0 / 252.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_sf_matches_reference() {
        // [19, 22, 16, 29, 24] against [20, 11, 17, 12], no ties
        let p = normal_sf(17.0, 5, 4, 0.0).unwrap();
        assert_relative_eq!(p, 0.0556734432665702, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_sf_all_tied_is_error() {
        // a single tie block of 4 cancels the variance
        assert!(normal_sf(2.0, 2, 2, 60.0).is_err());
    }
}
