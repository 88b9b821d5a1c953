use approx::assert_relative_eq;
use model_compare_core::{CoreError, ModelId, SignificanceLevel};
use model_compare_stats::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use test_case::test_case;

fn suite() -> StatisticalTestSuite {
    StatisticalTestSuite::default()
}

// Blom normal scores for n = 10
const NORMAL_10: [f64; 10] = [
    -1.547, -1.000, -0.655, -0.375, -0.123, 0.123, 0.375, 0.655, 1.000, 1.547,
];

fn shifted(offset: f64, scale: f64) -> Vec<f64> {
    NORMAL_10.iter().map(|z| offset + scale * z).collect()
}

// ===== Shapiro-Wilk =====

#[test]
fn test_shapiro_accepts_normal_scores() {
    let result = suite().shapiro("accuracy/model_1", &NORMAL_10).unwrap();

    assert_eq!(result.kind, TestKind::ShapiroWilk);
    assert_eq!(result.context, "accuracy/model_1");
    assert!(result.statistic > 0.95);
    assert!(result.verdict);
}

#[test]
fn test_shapiro_rejects_skewed_sample() {
    let skewed = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 5.0, 20.0];
    let result = suite().shapiro("skewed", &skewed).unwrap();

    assert!(result.p_value < 0.05);
    assert!(!result.verdict);
}

#[test]
fn test_shapiro_is_location_scale_invariant() {
    let base = suite().shapiro("base", &NORMAL_10).unwrap();
    let moved = suite().shapiro("moved", &shifted(100.0, 7.5)).unwrap();

    assert_relative_eq!(base.statistic, moved.statistic, epsilon = 1e-9);
    assert_relative_eq!(base.p_value, moved.p_value, epsilon = 1e-9);
}

#[test_case(&[] ; "empty")]
#[test_case(&[0.5] ; "single")]
#[test_case(&[0.5, 0.6] ; "pair")]
fn test_shapiro_insufficient_data(values: &[f64]) {
    assert!(matches!(
        suite().shapiro("small", values),
        Err(CoreError::InsufficientData(_))
    ));
}

// ===== Homogeneity =====

#[test]
fn test_levene_and_bartlett_agree_on_equal_spread() {
    let a = shifted(0.3, 0.01);
    let b = shifted(0.5, 0.01);
    let groups: Vec<&[f64]> = vec![&a, &b];

    let levene = suite().levene("accuracy", &groups).unwrap();
    let bartlett = suite().bartlett("accuracy", &groups).unwrap();

    assert_eq!(levene.kind, TestKind::Levene);
    assert_eq!(bartlett.kind, TestKind::Bartlett);
    assert!(levene.verdict);
    assert!(bartlett.verdict);
}

#[test]
fn test_bartlett_flags_unequal_spread() {
    let a = shifted(0.5, 0.01);
    let b = shifted(0.5, 0.2);
    let groups: Vec<&[f64]> = vec![&a, &b];

    let bartlett = suite().bartlett("f1", &groups).unwrap();
    assert!(!bartlett.verdict);
}

#[test]
fn test_homogeneity_needs_two_groups() {
    let a = shifted(0.5, 0.01);
    let groups: Vec<&[f64]> = vec![&a];

    assert!(matches!(
        suite().levene("single", &groups),
        Err(CoreError::InsufficientData(_))
    ));
    assert!(matches!(
        suite().bartlett("single", &groups),
        Err(CoreError::InsufficientData(_))
    ));
}

// ===== ANOVA / Kruskal-Wallis =====

#[test]
fn test_anova_detects_shifted_means() {
    let a = shifted(0.3, 0.01);
    let b = shifted(0.5, 0.01);
    let c = shifted(0.7, 0.01);
    let groups: Vec<&[f64]> = vec![&a, &b, &c];

    let result = suite().anova("accuracy", &groups).unwrap();
    assert!(result.statistic > 100.0);
    assert!(result.verdict);
}

#[test]
fn test_anova_identical_groups_not_significant() {
    let a = shifted(0.5, 0.01);
    let groups: Vec<&[f64]> = vec![&a, &a, &a];

    let result = suite().anova("accuracy", &groups).unwrap();
    assert_relative_eq!(result.statistic, 0.0, epsilon = 1e-9);
    assert!(!result.verdict);
}

#[test]
fn test_kruskal_separated_groups() {
    let a = [10.0, 11.0, 12.0, 13.0, 14.0];
    let b = [50.0, 51.0, 52.0, 53.0, 54.0];
    let c = [90.0, 91.0, 92.0, 93.0, 94.0];
    let groups: Vec<&[f64]> = vec![&a, &b, &c];

    let result = suite().kruskal("f1", &groups).unwrap();
    // Perfect separation of 3 groups of 5: H = 12.5
    assert_relative_eq!(result.statistic, 12.5, epsilon = 1e-9);
    assert!(result.verdict);
}

#[test]
fn test_kruskal_rejects_nan() {
    let a = [1.0, f64::NAN, 3.0];
    let b = [4.0, 5.0, 6.0];
    let groups: Vec<&[f64]> = vec![&a, &b];

    assert!(matches!(
        suite().kruskal("nan", &groups),
        Err(CoreError::InvalidInput(_))
    ));
}

// ===== Tukey HSD =====

#[test]
fn test_tukey_reports_every_pair() {
    let mut values = Vec::new();
    let mut labels = Vec::new();
    for (id, offset) in [("1", 0.3), ("2", 0.5), ("3", 0.7)] {
        values.extend(shifted(offset, 0.01));
        labels.extend(std::iter::repeat(ModelId::from(id)).take(NORMAL_10.len()));
    }

    let result = suite().tukey("accuracy", &values, &labels).unwrap();

    let pairs: Vec<(&str, &str)> = result
        .pairs
        .iter()
        .map(|p| (p.group_a.as_str(), p.group_b.as_str()))
        .collect();
    assert_eq!(pairs, vec![("1", "2"), ("1", "3"), ("2", "3")]);
    assert_eq!(result.rejects(), vec![true, true, true]);

    let diffs = result.mean_diffs();
    assert_relative_eq!(diffs[0], 0.2, epsilon = 1e-9);
    assert_relative_eq!(diffs[1], 0.4, epsilon = 1e-9);
    assert_relative_eq!(diffs[2], 0.2, epsilon = 1e-9);
    assert_eq!(result.df, 27.0);
}

#[test]
fn test_tukey_no_difference() {
    let mut values = Vec::new();
    let mut labels = Vec::new();
    for id in ["a", "b", "c"] {
        values.extend(shifted(0.5, 0.01));
        labels.extend(std::iter::repeat(ModelId::from(id)).take(NORMAL_10.len()));
    }

    let result = suite().tukey("f1", &values, &labels).unwrap();
    assert!(!result.any_rejected());
    for pair in &result.pairs {
        assert!(pair.lower < 0.0 && pair.upper > 0.0);
        assert!(pair.p_value > 0.99);
    }
}

// ===== Pairwise =====

#[test]
fn test_mann_whitney_exact_small_samples() {
    let a = ModelId::from("a");
    let b = ModelId::from("b");
    let result = suite()
        .mann_whitney("f1", &a, &[1.0, 2.0, 3.0, 4.0, 5.0], &b, &[6.0, 7.0, 8.0, 9.0, 10.0])
        .unwrap();

    assert_eq!(result.kind, TestKind::MannWhitney);
    assert_eq!(result.model_a, a);
    assert_eq!(result.model_b, b);
    assert_eq!(result.statistic, 0.0);
    // 2 / C(10, 5)
    assert_relative_eq!(result.p_value, 2.0 / 252.0, epsilon = 1e-12);
    assert!(result.verdict);
}

#[test]
fn test_mann_whitney_statistic_is_for_first_sample() {
    let a = ModelId::from("a");
    let b = ModelId::from("b");
    let x = [0.1, 0.4, 0.35, 0.8];
    let y = [0.2, 0.5, 0.9, 0.95, 0.7];

    let forward = suite().mann_whitney("m", &a, &x, &b, &y).unwrap();
    let backward = suite().mann_whitney("m", &b, &y, &a, &x).unwrap();

    assert_relative_eq!(forward.statistic + backward.statistic, 20.0);
    assert_relative_eq!(forward.p_value, backward.p_value, epsilon = 1e-12);
}

#[test]
fn test_t_student_two_models() {
    let a = ModelId::from("baseline");
    let b = ModelId::from("candidate");
    let result = suite()
        .t_student("accuracy", &a, &shifted(0.5, 0.01), &b, &shifted(0.8, 0.01))
        .unwrap();

    assert_eq!(result.kind, TestKind::StudentT);
    assert!(result.statistic < 0.0);
    assert!(result.verdict);
}

#[rstest]
#[case(0.01)]
#[case(0.05)]
#[case(0.10)]
fn test_verdicts_follow_alpha(#[case] alpha: f64) {
    let level = SignificanceLevel::new(alpha).unwrap();
    let suite = StatisticalTestSuite::new(level);
    let a = ModelId::from("a");
    let b = ModelId::from("b");

    let result = suite
        .t_student("t", &a, &[1.0, 2.0, 3.0, 4.0, 5.0], &b, &[3.0, 4.0, 5.0, 6.0, 7.0])
        .unwrap();

    // p ≈ 0.0805
    assert_eq!(suite.alpha(), level);
    assert_eq!(result.verdict, alpha > 0.0805);
}

// ===== Serialization =====

#[test]
fn test_result_serialized_shape() {
    let result = suite().shapiro("model 0", &shifted(0.5, 0.01)).unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["kind"], "shapiro_wilk");
    assert_eq!(value["context"], "model 0");
    assert_eq!(value["verdict"], true);

    let back: TestResult = serde_json::from_value(value).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_tukey_result_serialized_shape() {
    let values: Vec<f64> = [shifted(0.3, 0.01), shifted(0.7, 0.01)].concat();
    let labels: Vec<ModelId> = (0..20)
        .map(|i| ModelId::from(if i < 10 { "a" } else { "b" }))
        .collect();
    let result = suite().tukey("accuracy", &values, &labels).unwrap();
    let value = serde_json::to_value(&result).unwrap();

    let pairs = value["pairs"].as_array().unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0]["group_a"], "a");
    assert_eq!(pairs[0]["group_b"], "b");
    assert_eq!(pairs[0]["reject"], true);
}
