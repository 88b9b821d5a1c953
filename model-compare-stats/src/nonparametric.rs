//! Rank-based tests: Kruskal-Wallis H and Mann-Whitney U.

use model_compare_core::{CoreError, Result};
use statrs::distribution::ContinuousCDF;

use crate::checks::{ensure_finite, ensure_groups, ensure_len};
use crate::distributions::{chi2_sf, standard_normal};
use crate::ranks::{rank_with_groups, tie_term};
use crate::RawStatistic;

/// Smaller sample size up to which the exact U distribution is used.
pub const EXACT_MAX_SMALLER_SAMPLE: usize = 8;

pub fn kruskal_wallis(groups: &[&[f64]]) -> Result<RawStatistic> {
    const TEST: &str = "Kruskal-Wallis";
    ensure_groups(TEST, groups, 2, 1)?;

    let k = groups.len();
    let observations: Vec<(f64, usize)> = groups
        .iter()
        .enumerate()
        .flat_map(|(gi, g)| g.iter().map(move |&v| (v, gi)))
        .collect();
    let n = observations.len() as f64;

    let (sorted, ranks) = rank_with_groups(observations);
    let mut rank_sums = vec![0.0; k];
    for ((_, gi), r) in sorted.iter().zip(&ranks) {
        rank_sums[*gi] += r;
    }

    let tie_correction = 1.0 - tie_term(&sorted) / (n * n * n - n);
    if tie_correction <= 0.0 {
        return Err(CoreError::InvalidInput(format!(
            "{} is undefined when every observation is identical",
            TEST
        )));
    }

    let h = 12.0 / (n * (n + 1.0))
        * groups
            .iter()
            .zip(&rank_sums)
            .map(|(g, r)| r * r / g.len() as f64)
            .sum::<f64>()
        - 3.0 * (n + 1.0);
    let h = (h / tie_correction).max(0.0);

    Ok(RawStatistic {
        statistic: h,
        p_value: chi2_sf(h, (k - 1) as f64)?,
    })
}

/// Two-sided Mann-Whitney U test. The statistic is U for sample `a`.
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<RawStatistic> {
    const TEST: &str = "Mann-Whitney";
    ensure_len(TEST, a, 1)?;
    ensure_len(TEST, b, 1)?;
    ensure_finite(TEST, a)?;
    ensure_finite(TEST, b)?;

    let n1 = a.len();
    let n2 = b.len();
    let observations: Vec<(f64, usize)> = a
        .iter()
        .map(|&v| (v, 0))
        .chain(b.iter().map(|&v| (v, 1)))
        .collect();

    let (sorted, ranks) = rank_with_groups(observations);
    let r1: f64 = sorted
        .iter()
        .zip(&ranks)
        .filter(|((_, g), _)| *g == 0)
        .map(|(_, r)| r)
        .sum();

    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;
    let u_big = u1.max(u2);
    let ties = tie_term(&sorted);

    let p_value = if ties == 0.0 && n1.min(n2) <= EXACT_MAX_SMALLER_SAMPLE {
        exact_p_value(u_big, n1, n2)
    } else {
        asymptotic_p_value(u_big, n1f, n2f, ties)?
    };

    Ok(RawStatistic {
        statistic: u1,
        p_value: p_value.min(1.0),
    })
}

fn asymptotic_p_value(u_big: f64, n1: f64, n2: f64, ties: f64) -> Result<f64> {
    let n = n1 + n2;
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - ties / (n * (n - 1.0)));
    if variance <= 0.0 {
        return Err(CoreError::InvalidInput(
            "Mann-Whitney is undefined when every observation is identical".to_string(),
        ));
    }

    // Continuity correction
    let z = (u_big - n1 * n2 / 2.0 - 0.5) / variance.sqrt();
    Ok(2.0 * standard_normal()?.sf(z))
}

/// 2·P(U ≥ u_big) under the exact null distribution.
fn exact_p_value(u_big: f64, n1: usize, n2: usize) -> f64 {
    let counts = u_distribution(n1.min(n2), n1.max(n2));
    let total: i128 = counts.iter().sum();
    let start = u_big.round() as usize;
    let upper: i128 = counts.iter().skip(start).sum();
    2.0 * upper as f64 / total as f64
}

/// Number of rank arrangements giving each U, i.e. the coefficients of the
/// Gaussian binomial `[m + n choose m]_q`.
fn u_distribution(m: usize, n: usize) -> Vec<i128> {
    let max_u = m * n;
    let mut coeffs = vec![0i128; max_u + 1];
    coeffs[0] = 1;

    for i in 1..=m {
        // × (1 − q^(n+i))
        let shift = n + i;
        for u in (shift..=max_u).rev() {
            coeffs[u] -= coeffs[u - shift];
        }
        // ÷ (1 − q^i)
        for u in i..=max_u {
            coeffs[u] += coeffs[u - i];
        }
    }

    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_u_distribution_small() {
        // m = 2, n = 2: U ∈ {0, 1, 2, 3, 4} with counts 1, 1, 2, 1, 1
        assert_eq!(u_distribution(2, 2), vec![1, 1, 2, 1, 1]);
        let total: i128 = u_distribution(3, 5).iter().sum();
        assert_eq!(total, 56);
    }

    #[test]
    fn test_exact_separated_samples() {
        let r = mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert_relative_eq!(r.p_value, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_asymptotic_with_ties() {
        let a = [1.0, 2.0, 3.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let b = [11.0, 12.0, 13.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0, 19.0];
        let r = mann_whitney_u(&a, &b).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert!(r.p_value < 0.001);
    }

    #[test]
    fn test_identical_samples_not_significant() {
        let r = mann_whitney_u(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(r.p_value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kruskal_closed_form() {
        let r = kruskal_wallis(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]]).unwrap();
        assert_relative_eq!(r.statistic, 7.2, epsilon = 1e-9);
        assert_relative_eq!(r.p_value, (-3.6f64).exp(), epsilon = 1e-9);
    }

    #[test]
    fn test_kruskal_all_identical() {
        assert!(matches!(
            kruskal_wallis(&[&[1.0, 1.0], &[1.0, 1.0]]),
            Err(CoreError::InvalidInput(_))
        ));
    }
}
