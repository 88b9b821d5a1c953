//! Shapiro-Wilk normality test.
//!
//! W statistic and p-value per Royston (1992) "Approximating the Shapiro-Wilk
//! W-test for non-normality" and Royston (1995) "Remark AS R94". The p-value is
//! exact for n = 3.

use model_compare_core::{CoreError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::checks::{ensure_finite, ensure_len};
use crate::distributions::standard_normal;
use crate::RawStatistic;

const TEST: &str = "Shapiro-Wilk";
const MAX_ACCURATE_N: usize = 5000;

// Royston polynomial coefficients
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

pub fn shapiro_wilk(values: &[f64]) -> Result<RawStatistic> {
    ensure_len(TEST, values, 3)?;
    ensure_finite(TEST, values)?;

    let n = values.len();
    if n > MAX_ACCURATE_N {
        tracing::warn!(
            "Shapiro-Wilk p-value may be inaccurate for {} observations (> {})",
            n,
            MAX_ACCURATE_N
        );
    }

    let mut x = values.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));

    if x[n - 1] - x[0] == 0.0 {
        tracing::warn!("Shapiro-Wilk input has zero range; treating sample as normal");
        return Ok(RawStatistic {
            statistic: 1.0,
            p_value: 1.0,
        });
    }

    if n == 3 {
        return Ok(exact_n3(&x));
    }

    let norm = standard_normal()?;
    let nn2 = n / 2;
    let a = coefficients(n, nn2, &norm)?;

    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let sa: f64 = (0..nn2).map(|i| a[i] * (x[n - 1 - i] - x[i])).sum();
    let w = ((sa * sa) / ss).min(1.0);

    let p_value = p_value(w, n, &norm).clamp(0.0, 1.0);

    Ok(RawStatistic {
        statistic: w,
        p_value,
    })
}

fn exact_n3(x: &[f64]) -> RawStatistic {
    let mean = (x[0] + x[1] + x[2]) / 3.0;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let numerator = std::f64::consts::FRAC_1_SQRT_2 * (x[2] - x[0]);
    let w = ((numerator * numerator) / ss).clamp(0.75, 1.0);

    // p = (6/π)(asin(√W) − π/3)
    let p = (6.0 / std::f64::consts::PI) * (w.sqrt().asin() - std::f64::consts::FRAC_PI_3);

    RawStatistic {
        statistic: w,
        p_value: p.clamp(0.0, 1.0),
    }
}

fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &coef| acc * x + coef)
}

fn coefficients(n: usize, nn2: usize, norm: &Normal) -> Result<Vec<f64>> {
    let an25 = n as f64 + 0.25;
    let m: Vec<f64> = (0..nn2)
        .map(|i| norm.inverse_cdf((i as f64 + 1.0 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    let mut a = vec![0.0; nn2];

    let (corrected, fac_sq, one_minus) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        (
            2,
            summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1],
            1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2,
        )
    } else {
        (1, summ2 - 2.0 * m[0] * m[0], 1.0 - 2.0 * a1 * a1)
    };

    if fac_sq <= 0.0 || one_minus <= 0.0 {
        return Err(CoreError::Numerical(format!(
            "Shapiro-Wilk coefficients are undefined for n = {}",
            n
        )));
    }

    let fac = (fac_sq / one_minus).sqrt();
    a[0] = a1;
    for i in corrected..nn2 {
        a[i] = -m[i] / fac;
    }

    Ok(a)
}

fn p_value(w: f64, n: usize, norm: &Normal) -> f64 {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    let (y, m, s) = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return 0.0;
        }
        (-(gamma - y).ln(), poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let xx = nf.ln();
        (y, poly(&C5, xx), poly(&C6, xx).exp())
    };

    norm.sf((y - m) / s)
}
