//! Homogeneity-of-variance tests.

use model_compare_core::{median, Result};

use crate::checks::ensure_groups;
use crate::distributions::chi2_sf;
use crate::parametric::{anova_table, f_test};
use crate::RawStatistic;

/// Brown-Forsythe flavour of Levene's test: ANOVA on absolute deviations from
/// each group's median.
pub fn levene(groups: &[&[f64]]) -> Result<RawStatistic> {
    const TEST: &str = "Levene";
    ensure_groups(TEST, groups, 2, 2)?;

    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| {
            let center = median(g);
            g.iter().map(|x| (x - center).abs()).collect()
        })
        .collect();

    // Identical deviations everywhere (e.g. every group constant): equal spread
    let first = deviations[0][0];
    if deviations.iter().flatten().all(|d| *d == first) {
        return Ok(RawStatistic {
            statistic: 0.0,
            p_value: 1.0,
        });
    }

    let refs: Vec<&[f64]> = deviations.iter().map(|d| d.as_slice()).collect();
    let table = anova_table(TEST, &refs)?;
    f_test(TEST, &table)
}

/// Bartlett's test; assumes normal groups.
pub fn bartlett(groups: &[&[f64]]) -> Result<RawStatistic> {
    const TEST: &str = "Bartlett";
    ensure_groups(TEST, groups, 2, 2)?;

    let k = groups.len() as f64;
    let mut sizes = Vec::with_capacity(groups.len());
    let mut variances = Vec::with_capacity(groups.len());
    for g in groups {
        let n = g.len() as f64;
        let mean = g.iter().sum::<f64>() / n;
        let var = g.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        sizes.push(n);
        variances.push(var);
    }

    // Zero variance everywhere is equal spread; only in some groups, maximally unequal
    let constant = variances.iter().filter(|v| **v <= 0.0).count();
    if constant == variances.len() {
        return Ok(RawStatistic {
            statistic: 0.0,
            p_value: 1.0,
        });
    }
    if constant > 0 {
        return Ok(RawStatistic {
            statistic: f64::INFINITY,
            p_value: 0.0,
        });
    }

    let n_total: f64 = sizes.iter().sum();
    let nk = n_total - k;
    let pooled = sizes
        .iter()
        .zip(&variances)
        .map(|(n, v)| (n - 1.0) * v)
        .sum::<f64>()
        / nk;

    let numerator = nk * pooled.ln()
        - sizes
            .iter()
            .zip(&variances)
            .map(|(n, v)| (n - 1.0) * v.ln())
            .sum::<f64>();
    let recip: f64 = sizes.iter().map(|n| 1.0 / (n - 1.0)).sum();
    let correction = 1.0 + (recip - 1.0 / nk) / (3.0 * (k - 1.0));

    let statistic = numerator / correction;
    Ok(RawStatistic {
        statistic,
        p_value: chi2_sf(statistic, k - 1.0)?,
    })
}
