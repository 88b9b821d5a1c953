use model_compare_core::*;
use rstest::rstest;
use validator::Validate;

// ===== SignificanceLevel Tests =====

#[test]
fn test_significance_level_default() {
    let alpha = SignificanceLevel::default();
    assert_eq!(alpha.value(), 0.05);
}

#[rstest]
#[case(0.0)]
#[case(1.0)]
#[case(-0.1)]
#[case(1.5)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn test_significance_level_rejects_out_of_range(#[case] alpha: f64) {
    let err = SignificanceLevel::new(alpha).unwrap_err();
    assert!(matches!(err, CoreError::Configuration(_)));
}

#[test]
fn test_boundary_p_value_is_conservative() {
    let alpha = SignificanceLevel::new(0.05).unwrap();

    // Exact tie: not significant, but consistent with the assumption
    assert!(!alpha.is_significant(0.05));
    assert!(alpha.is_consistent(0.05));

    assert!(alpha.is_significant(0.049_999));
    assert!(!alpha.is_consistent(0.049_999));
}

#[test]
fn test_significance_level_deserialization_validates() {
    let ok: SignificanceLevel = serde_json::from_str("0.01").unwrap();
    assert_eq!(ok.value(), 0.01);

    let bad: std::result::Result<SignificanceLevel, _> = serde_json::from_str("2.0");
    assert!(bad.is_err());
}

// ===== ComparisonConfig Tests =====

#[test]
fn test_comparison_config_default() {
    let config = ComparisonConfig::default();

    assert_eq!(config.alpha, 0.05);
    assert_eq!(config.homogeneity_test, HomogeneityTest::Levene);
    assert_eq!(config.ranking, RankingPolicy::Median);
    assert_eq!(config.failure_policy, FailurePolicy::Isolate);
    assert!(config.task.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_comparison_config_from_partial_json() {
    let config: ComparisonConfig =
        serde_json::from_str(r#"{"alpha": 0.1, "ranking": "mean_when_parametric"}"#).unwrap();

    assert_eq!(config.alpha, 0.1);
    assert_eq!(config.ranking, RankingPolicy::MeanWhenParametric);
    assert_eq!(config.homogeneity_test, HomogeneityTest::Levene);
}

#[test]
fn test_comparison_config_invalid_alpha() {
    let config = ComparisonConfig {
        alpha: 1.2,
        ..Default::default()
    };

    assert!(config.validate().is_err());
    assert!(matches!(
        config.significance_level(),
        Err(CoreError::Configuration(_))
    ));
}

#[test]
fn test_policies_serialization() {
    assert_eq!(
        serde_json::to_string(&HomogeneityTest::Bartlett).unwrap(),
        "\"bartlett\""
    );
    assert_eq!(
        serde_json::to_string(&FailurePolicy::FailFast).unwrap(),
        "\"fail_fast\""
    );
    assert_eq!(
        serde_json::to_string(&TaskKind::Regression).unwrap(),
        "\"regression\""
    );
}

// ===== TaskKind Tests =====

#[rstest]
#[case(TaskKind::Classification, "accuracy", true)]
#[case(TaskKind::Classification, "recall", true)]
#[case(TaskKind::Classification, "mae", false)]
#[case(TaskKind::Regression, "r2", true)]
#[case(TaskKind::Regression, "f1", false)]
fn test_task_kind_supports(#[case] task: TaskKind, #[case] metric: &str, #[case] expected: bool) {
    assert_eq!(task.supports(&MetricName::from(metric)), expected);
}

#[test]
fn test_task_kind_accepts_partially_valid_request() {
    let metrics = vec![MetricName::from("accuracy"), MetricName::from("custom_score")];
    assert!(TaskKind::Classification.validate_metrics(&metrics).is_ok());
}

#[test]
fn test_task_kind_rejects_foreign_metrics() {
    let metrics = vec![MetricName::from("accuracy"), MetricName::from("f1")];
    let err = TaskKind::Regression.validate_metrics(&metrics).unwrap_err();
    assert!(matches!(err, CoreError::Configuration(_)));
}
