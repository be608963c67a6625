//! Shapiro-Wilk W test, Royston's approximation (algorithm AS R94).

use cohort_stats_core::Result;
use statrs::distribution::{ContinuousCDF, Normal};

use super::{ensure_finite, procedure_error, sorted, standard_normal};

const MIN_SAMPLE: usize = 3;
const MAX_SAMPLE: usize = 5000;

// Polynomial coefficients, lowest order first
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Returns `(W, p_value)`
pub fn shapiro_wilk(sample: &[f64]) -> Result<(f64, f64)> {
    let n = sample.len();
    if !(MIN_SAMPLE..=MAX_SAMPLE).contains(&n) {
        return Err(procedure_error(format!(
            "Shapiro-Wilk needs between {} and {} observations, got {}",
            MIN_SAMPLE, MAX_SAMPLE, n
        )));
    }
    ensure_finite(sample, "Shapiro-Wilk")?;

    let x = sorted(sample);
    if x[n - 1] - x[0] <= f64::EPSILON * x[n - 1].abs().max(1.0) {
        return Err(procedure_error("Shapiro-Wilk is undefined for a constant sample"));
    }

    let normal = standard_normal()?;
    let a = coefficients(n, &normal)?;

    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();

    let w = (numerator * numerator / ss).min(1.0);
    let p_value = p_value(w, n, &normal);

    Ok((w, p_value.clamp(0.0, 1.0)))
}

/// Upper-half coefficients a_1..a_{n/2}, normalised so the full
/// antisymmetric vector has unit length
fn coefficients(n: usize, normal: &Normal) -> Result<Vec<f64>> {
    let half = n / 2;
    if n == 3 {
        return Ok(vec![std::f64::consts::FRAC_1_SQRT_2]);
    }

    // Expected normal order statistics of the lower half, all negative
    let an = n as f64;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (an + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();

    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; half];
    a[0] = a1;
    let (first_plain, fac_sq) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        (
            2,
            (summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
                / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2),
        )
    } else {
        (1, (summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1))
    };

    if !(fac_sq > 0.0) {
        return Err(procedure_error("Shapiro-Wilk coefficients are degenerate"));
    }
    let fac = fac_sq.sqrt();
    for i in first_plain..half {
        a[i] = -m[i] / fac;
    }

    Ok(a)
}

fn p_value(w: f64, n: usize, normal: &Normal) -> f64 {
    if w >= 1.0 {
        return 1.0;
    }

    if n == 3 {
        let stqr = std::f64::consts::FRAC_PI_3;
        return (6.0 / std::f64::consts::PI) * (w.sqrt().asin() - stqr);
    }

    let an = n as f64;
    let y = (1.0 - w).ln();
    let (y, m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return 0.0;
        }
        (-(gamma - y).ln(), poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (y, poly(&C5, xx), poly(&C6, xx).exp())
    };

    normal.sf((y - m) / s)
}

/// c[0] + c[1] x + c[2] x^2 + ...
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, coef| acc * x + coef)
}
