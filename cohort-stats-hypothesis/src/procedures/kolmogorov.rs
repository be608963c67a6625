//! One-sample Kolmogorov-Smirnov test against a normal reference.
//!
//! The two-sided p-value uses the exact distribution of D_n
//! (Marsaglia, Tsang & Wang 2003) up to [`EXACT_LIMIT`] observations and
//! Kolmogorov's limiting distribution beyond it.

use cohort_stats_core::Result;
use statrs::distribution::{ContinuousCDF, Normal};

use super::{ensure_finite, procedure_error, sorted};

pub const EXACT_LIMIT: usize = 10_000;

const SCALE: f64 = 1e140;
const SCALE_EXPONENT: i32 = 140;

/// Returns `(D, p_value)` for H0: the sample is drawn from N(mean, std_dev)
pub fn ks_test_normal(sample: &[f64], mean: f64, std_dev: f64) -> Result<(f64, f64)> {
    if sample.is_empty() {
        return Err(procedure_error("Kolmogorov-Smirnov needs at least one observation"));
    }
    ensure_finite(sample, "Kolmogorov-Smirnov")?;
    let reference = Normal::new(mean, std_dev).map_err(|e| {
        procedure_error(format!(
            "invalid normal reference N({}, {}): {}",
            mean, std_dev, e
        ))
    })?;

    let x = sorted(sample);
    let n = x.len() as f64;
    let d = x
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let cdf = reference.cdf(v);
            let above = (i as f64 + 1.0) / n - cdf;
            let below = cdf - i as f64 / n;
            above.max(below)
        })
        .fold(0.0_f64, f64::max);

    Ok((d, two_sided_sf(x.len(), d)))
}

/// P(D_n >= d)
pub fn two_sided_sf(n: usize, d: f64) -> f64 {
    let nf = n as f64;
    if nf * d <= 0.5 {
        return 1.0;
    }
    if d >= 1.0 {
        return 0.0;
    }
    let p = if n <= EXACT_LIMIT {
        1.0 - kolmogorov_cdf(n, d)
    } else {
        asymptotic_sf(d * nf.sqrt())
    };
    p.clamp(0.0, 1.0)
}

/// P(D_n < d), exact for finite n
pub fn kolmogorov_cdf(n: usize, d: f64) -> f64 {
    let nf = n as f64;
    let s = d * d * nf;
    if s > 7.24 || (s > 3.76 && n > 99) {
        return 1.0 - 2.0 * (-(2.000071 + 0.331 / nf.sqrt() + 1.409 / nf) * s).exp();
    }

    let k = (nf * d) as usize + 1;
    let m = 2 * k - 1;
    let h = k as f64 - nf * d;

    let mut hm = vec![0.0; m * m];
    for i in 0..m {
        for j in 0..m {
            if i + 1 >= j {
                hm[i * m + j] = 1.0;
            }
        }
    }
    for i in 0..m {
        hm[i * m] -= h.powi(i as i32 + 1);
        hm[(m - 1) * m + i] -= h.powi((m - i) as i32);
    }
    if 2.0 * h - 1.0 > 0.0 {
        hm[(m - 1) * m] += (2.0 * h - 1.0).powi(m as i32);
    }
    for i in 0..m {
        for j in 0..m {
            if i + 1 > j {
                for g in 1..=(i + 1 - j) {
                    hm[i * m + j] /= g as f64;
                }
            }
        }
    }

    let (q, mut exponent) = matrix_power(&hm, 0, m, n);
    let mut s = q[(k - 1) * m + k - 1];
    for i in 1..=n {
        s = s * i as f64 / nf;
        if s < 1.0 / SCALE {
            s *= SCALE;
            exponent -= SCALE_EXPONENT;
        }
    }
    s * 10f64.powi(exponent)
}

/// Kolmogorov's limiting survival function Q(lambda)
fn asymptotic_sf(lambda: f64) -> f64 {
    let mut sum = 0.0;
    for j in 1..=100 {
        let jf = j as f64;
        let term = (-2.0 * jf * jf * lambda * lambda).exp();
        sum += if j % 2 == 1 { term } else { -term };
        if term < 1e-16 {
            break;
        }
    }
    2.0 * sum
}

fn matrix_multiply(a: &[f64], b: &[f64], m: usize) -> Vec<f64> {
    let mut c = vec![0.0; m * m];
    for i in 0..m {
        for k in 0..m {
            let aik = a[i * m + k];
            if aik == 0.0 {
                continue;
            }
            for j in 0..m {
                c[i * m + j] += aik * b[k * m + j];
            }
        }
    }
    c
}

/// A^n with a decimal exponent carried separately to avoid overflow
fn matrix_power(a: &[f64], a_exponent: i32, m: usize, n: usize) -> (Vec<f64>, i32) {
    if n == 1 {
        return (a.to_vec(), a_exponent);
    }

    let (half, half_exponent) = matrix_power(a, a_exponent, m, n / 2);
    let squared = matrix_multiply(&half, &half, m);
    let (mut v, mut exponent) = if n % 2 == 0 {
        (squared, 2 * half_exponent)
    } else {
        (matrix_multiply(a, &squared, m), a_exponent + 2 * half_exponent)
    };

    if v[(m / 2) * m + m / 2] > SCALE {
        for value in v.iter_mut() {
            *value /= SCALE;
        }
        exponent += SCALE_EXPONENT;
    }
    (v, exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_cdf_matches_published_value() {
        // Marsaglia, Tsang & Wang (2003), K(10, 0.274)
        assert_relative_eq!(kolmogorov_cdf(10, 0.274), 0.6284796154565043, epsilon = 1e-9);
    }

    #[test]
    fn test_sf_bounds() {
        assert_eq!(two_sided_sf(10, 0.01), 1.0);
        assert_eq!(two_sided_sf(10, 1.0), 0.0);
        let p = two_sided_sf(50, 0.2);
        assert!(p > 0.0 && p < 0.1);
    }

    #[test]
    fn test_sf_decreases_with_d() {
        let mut last = 1.0;
        for d in [0.05, 0.1, 0.15, 0.2, 0.3] {
            let p = two_sided_sf(40, d);
            assert!(p <= last);
            last = p;
        }
    }

    #[test]
    fn test_asymptotic_agrees_with_exact_for_large_n() {
        let n = 2000;
        let d = 0.02;
        let exact = 1.0 - kolmogorov_cdf(n, d);
        let asymptotic = asymptotic_sf(d * (n as f64).sqrt());
        assert_relative_eq!(exact, asymptotic, epsilon = 0.02);
    }
}
