//! Tukey's honestly significant difference (Tukey-Kramer for unequal sizes).

use model_compare_core::{CoreError, ModelId, Result, SignificanceLevel};

use crate::checks::ensure_finite;
use crate::distributions::{ptukey, qtukey};
use crate::parametric::anova_table;
use crate::results::{TukeyPair, TukeyResult};

const TEST: &str = "Tukey HSD";

/// Splits pooled `values` by `labels`, keeping groups in order of first
/// appearance.
pub fn group_by_label<'a>(
    values: &[f64],
    labels: &'a [ModelId],
) -> Result<Vec<(&'a ModelId, Vec<f64>)>> {
    if values.len() != labels.len() {
        return Err(CoreError::InvalidInput(format!(
            "{} got {} values but {} labels",
            TEST,
            values.len(),
            labels.len()
        )));
    }

    let mut groups: Vec<(&ModelId, Vec<f64>)> = Vec::new();
    for (value, label) in values.iter().zip(labels) {
        match groups.iter_mut().find(|(id, _)| *id == label) {
            Some((_, group)) => group.push(*value),
            None => groups.push((label, vec![*value])),
        }
    }
    Ok(groups)
}

pub fn tukey_hsd(
    context: impl Into<String>,
    values: &[f64],
    labels: &[ModelId],
    alpha: SignificanceLevel,
) -> Result<TukeyResult> {
    ensure_finite(TEST, values)?;
    let groups = group_by_label(values, labels)?;

    let refs: Vec<&[f64]> = groups.iter().map(|(_, g)| g.as_slice()).collect();
    let table = anova_table(TEST, &refs)?;
    if table.df_within < 2 {
        return Err(CoreError::InsufficientData(format!(
            "{} needs at least 2 more observations ({}) than groups ({})",
            TEST,
            values.len(),
            groups.len()
        )));
    }
    let k = groups.len() as f64;
    let df = table.df_within as f64;
    let mse = table.ms_within();

    let q_crit = qtukey(1.0 - alpha.value(), k, df)?;

    let mut pairs = Vec::with_capacity(groups.len() * (groups.len() - 1) / 2);
    for i in 0..groups.len() {
        for j in (i + 1)..groups.len() {
            let (id_a, a) = &groups[i];
            let (id_b, b) = &groups[j];
            let mean_diff = table.group_means[j] - table.group_means[i];
            let std_err = (mse / 2.0 * (1.0 / a.len() as f64 + 1.0 / b.len() as f64)).sqrt();

            let (q_statistic, p_value) = if std_err == 0.0 {
                if mean_diff == 0.0 {
                    (0.0, 1.0)
                } else {
                    (f64::INFINITY, 0.0)
                }
            } else {
                let q = mean_diff.abs() / std_err;
                (q, (1.0 - ptukey(q, k, df)?).clamp(0.0, 1.0))
            };

            pairs.push(TukeyPair {
                group_a: (*id_a).clone(),
                group_b: (*id_b).clone(),
                mean_diff,
                std_err,
                q_statistic,
                p_value,
                lower: mean_diff - q_crit * std_err,
                upper: mean_diff + q_crit * std_err,
                reject: alpha.is_significant(p_value),
            });
        }
    }

    Ok(TukeyResult {
        context: context.into(),
        q_crit,
        df,
        pairs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn labels(layout: &[(&str, usize)]) -> Vec<ModelId> {
        layout.iter()
            .flat_map(|(id, n)| std::iter::repeat(ModelId::from(*id)).take(*n))
            .collect()
    }

    #[test]
    fn test_groups_follow_first_appearance() {
        let ids = vec![
            ModelId::from("b"),
            ModelId::from("a"),
            ModelId::from("b"),
        ];
        let groups = group_by_label(&[1.0, 2.0, 3.0], &ids).unwrap();
        assert_eq!(groups[0].0.as_str(), "b");
        assert_eq!(groups[0].1, vec![1.0, 3.0]);
        assert_eq!(groups[1].0.as_str(), "a");
    }

    #[test]
    fn test_length_mismatch() {
        let ids = labels(&[("a", 2)]);
        assert!(matches!(
            group_by_label(&[1.0, 2.0, 3.0], &ids),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_one_error_degree_of_freedom_is_insufficient() {
        let ids = labels(&[("a", 2), ("b", 1)]);
        assert!(matches!(
            tukey_hsd("t", &[1.0, 2.0, 5.0], &ids, SignificanceLevel::default()),
            Err(CoreError::InsufficientData(_))
        ));

        let ids = labels(&[("a", 2), ("b", 2)]);
        assert!(tukey_hsd("t", &[1.0, 2.0, 5.0, 6.0], &ids, SignificanceLevel::default()).is_ok());
    }

    #[test]
    fn test_separated_groups() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let ids = labels(&[("a", 3), ("b", 3), ("c", 3)]);
        let r = tukey_hsd("t", &values, &ids, SignificanceLevel::default()).unwrap();

        assert_eq!(r.pairs.len(), 3);
        assert_eq!(r.df, 6.0);
        assert_relative_eq!(r.q_crit, 4.339, epsilon = 5e-3);

        // a-b and b-c differ by 3 with se = sqrt(1/3): q = 5.196
        let ab = &r.pairs[0];
        assert_eq!(ab.group_a.as_str(), "a");
        assert_eq!(ab.group_b.as_str(), "b");
        assert_relative_eq!(ab.mean_diff, 3.0, epsilon = 1e-12);
        assert_relative_eq!(ab.q_statistic, 27f64.sqrt(), epsilon = 1e-9);
        assert!(ab.reject);
        assert!(ab.lower > 0.0);

        let ac = &r.pairs[1];
        assert_eq!(ac.group_b.as_str(), "c");
        assert!(ac.p_value < ab.p_value);
        assert!(r.any_rejected());
    }
}
