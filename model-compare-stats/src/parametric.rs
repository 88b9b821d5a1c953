//! One-way ANOVA and the pooled-variance two-sample t-test.

use model_compare_core::{CoreError, Result};

use crate::checks::{ensure_finite, ensure_groups, ensure_len};
use crate::distributions::{f_sf, t_two_sided};
use crate::RawStatistic;

/// Sums of squares of a one-way layout.
#[derive(Debug, Clone)]
pub(crate) struct AnovaTable {
    pub ss_between: f64,
    pub ss_within: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub group_means: Vec<f64>,
}

impl AnovaTable {
    pub fn ms_within(&self) -> f64 {
        self.ss_within / self.df_within as f64
    }

    pub fn ms_between(&self) -> f64 {
        self.ss_between / self.df_between as f64
    }
}

pub(crate) fn anova_table(test: &str, groups: &[&[f64]]) -> Result<AnovaTable> {
    ensure_groups(test, groups, 2, 1)?;

    let k = groups.len();
    let total_n: usize = groups.iter().map(|g| g.len()).sum();
    if total_n <= k {
        return Err(CoreError::InsufficientData(format!(
            "{} needs more observations ({}) than groups ({})",
            test, total_n, k
        )));
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / total_n as f64;
    let group_means: Vec<f64> = groups
        .iter()
        .map(|g| g.iter().sum::<f64>() / g.len() as f64)
        .collect();

    let ss_between = groups
        .iter()
        .zip(&group_means)
        .map(|(g, m)| g.len() as f64 * (m - grand_mean).powi(2))
        .sum();
    let ss_within = groups
        .iter()
        .zip(&group_means)
        .map(|(g, m)| g.iter().map(|x| (x - m).powi(2)).sum::<f64>())
        .sum();

    Ok(AnovaTable {
        ss_between,
        ss_within,
        df_between: k - 1,
        df_within: total_n - k,
        group_means,
    })
}

pub(crate) fn f_test(test: &str, table: &AnovaTable) -> Result<RawStatistic> {
    let ms_between = table.ms_between();
    let ms_within = table.ms_within();

    if ms_within == 0.0 {
        // Every observation identical: no evidence of any difference
        if ms_between == 0.0 {
            tracing::warn!("{}: every observation is identical, reporting p = 1", test);
            return Ok(RawStatistic {
                statistic: 0.0,
                p_value: 1.0,
            });
        }
        return Ok(RawStatistic {
            statistic: f64::INFINITY,
            p_value: 0.0,
        });
    }

    let f = ms_between / ms_within;
    Ok(RawStatistic {
        statistic: f,
        p_value: f_sf(f, table.df_between as f64, table.df_within as f64)?,
    })
}

pub fn one_way_anova(groups: &[&[f64]]) -> Result<RawStatistic> {
    let table = anova_table("ANOVA", groups)?;
    f_test("ANOVA", &table)
}

pub fn student_t(a: &[f64], b: &[f64]) -> Result<RawStatistic> {
    const TEST: &str = "Student's t-test";
    ensure_len(TEST, a, 1)?;
    ensure_len(TEST, b, 1)?;
    ensure_finite(TEST, a)?;
    ensure_finite(TEST, b)?;

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let df = n1 + n2 - 2.0;
    if df < 1.0 {
        return Err(CoreError::InsufficientData(format!(
            "{} needs at least 3 observations in total, got {}",
            TEST,
            a.len() + b.len()
        )));
    }

    let mean1 = a.iter().sum::<f64>() / n1;
    let mean2 = b.iter().sum::<f64>() / n2;
    let ss1: f64 = a.iter().map(|x| (x - mean1).powi(2)).sum();
    let ss2: f64 = b.iter().map(|x| (x - mean2).powi(2)).sum();
    let pooled_var = (ss1 + ss2) / df;
    let se = (pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt();
    let diff = mean1 - mean2;

    if se == 0.0 {
        if diff == 0.0 {
            tracing::warn!("{}: both samples are the same constant, reporting p = 1", TEST);
            return Ok(RawStatistic {
                statistic: 0.0,
                p_value: 1.0,
            });
        }
        return Ok(RawStatistic {
            statistic: diff.signum() * f64::INFINITY,
            p_value: 0.0,
        });
    }

    let t = diff / se;
    Ok(RawStatistic {
        statistic: t,
        p_value: t_two_sided(t, df)?,
    })
}
