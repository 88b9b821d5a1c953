use model_compare_core::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use test_case::test_case;

// ===== SampleSet Tests =====

#[test]
fn test_sample_set_preserves_order() {
    let set = SampleSet::new(vec![
        ("b", vec![1.0, 2.0]),
        ("a", vec![3.0]),
        ("c", vec![4.0, 5.0, 6.0]),
    ])
    .unwrap();

    let ids: Vec<&str> = set.model_ids().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
    assert_eq!(set.len(), 3);
    assert_eq!(set.get(&ModelId::from("a")), Some(&[3.0][..]));
    assert_eq!(set.get(&ModelId::from("z")), None);
}

#[test]
fn test_sample_set_rejects_empty_sequence() {
    let err = SampleSet::new(vec![("a", vec![1.0]), ("b", vec![])]).unwrap_err();
    assert!(matches!(err, CoreError::InsufficientData(_)));
}

#[test]
fn test_sample_set_rejects_duplicate_ids() {
    let err = SampleSet::new(vec![("a", vec![1.0]), ("a", vec![2.0])]).unwrap_err();
    assert!(matches!(err, CoreError::Configuration(_)));
}

#[test]
fn test_sample_set_pooled_labels() {
    let set = SampleSet::new(vec![("x", vec![1.0, 2.0]), ("y", vec![3.0])]).unwrap();
    let (values, labels) = set.pooled();

    assert_eq!(values, vec![1.0, 2.0, 3.0]);
    assert_eq!(
        labels,
        vec![ModelId::from("x"), ModelId::from("x"), ModelId::from("y")]
    );
}

#[test]
fn test_sample_set_pairs_in_index_order() {
    let set = SampleSet::new(vec![
        (0usize, vec![1.0]),
        (1usize, vec![2.0]),
        (2usize, vec![3.0]),
    ])
    .unwrap();

    let pairs: Vec<(String, String)> = set
        .pairs()
        .into_iter()
        .map(|(a, b)| (a.id.to_string(), b.id.to_string()))
        .collect();

    assert_eq!(
        pairs,
        vec![
            ("0".to_string(), "1".to_string()),
            ("0".to_string(), "2".to_string()),
            ("1".to_string(), "2".to_string()),
        ]
    );
}

// ===== Scores Tests =====

#[test]
fn test_scores_rejects_duplicate_metric() {
    let set = SampleSet::new(vec![("a", vec![1.0]), ("b", vec![2.0])]).unwrap();
    let err = Scores::new(vec![("accuracy", set.clone()), ("accuracy", set)]).unwrap_err();
    assert!(matches!(err, CoreError::Configuration(_)));
}

#[test]
fn test_scores_iteration_order() {
    let set = SampleSet::new(vec![("a", vec![1.0]), ("b", vec![2.0])]).unwrap();
    let scores = Scores::new(vec![("recall", set.clone()), ("accuracy", set)]).unwrap();

    let names: Vec<&str> = scores.metric_names().map(|m| m.as_str()).collect();
    assert_eq!(names, vec!["recall", "accuracy"]);
    assert!(scores.get(&MetricName::from("accuracy")).is_some());
}

#[test]
fn test_scores_as_source() {
    let set = SampleSet::new(vec![("a", vec![1.0]), ("b", vec![2.0])]).unwrap();
    let scores = Scores::new(vec![("f1", set)]).unwrap();

    assert_eq!(scores.load_scores().unwrap(), scores);
}

// ===== DescriptiveStats Tests =====

#[test]
fn test_descriptive_stats_negative_values() {
    let stats = DescriptiveStats::compute(ModelId::from("m"), &[-3.0, -1.0, -2.0]).unwrap();

    assert_eq!(stats.median, -2.0);
    assert_eq!(stats.min, -3.0);
    assert_eq!(stats.max, -1.0);
}

#[test_case(&[0.9, 0.1, 0.5], 0.5 ; "odd length")]
#[test_case(&[0.4, 0.1, 0.3, 0.2], 0.25 ; "even length takes midpoint")]
#[test_case(&[0.7, 0.7, 0.7], 0.7 ; "constant")]
fn test_descriptive_stats_median(values: &[f64], expected: f64) {
    let stats = DescriptiveStats::compute(ModelId::from("m"), values).unwrap();
    assert!((stats.median - expected).abs() < 1e-12);
}

#[test_case(&[0.2, 0.5, 0.5, 0.9], 0.5 ; "most frequent")]
#[test_case(&[0.3, 0.1, 0.1, 0.3], 0.3 ; "tie goes to first seen")]
#[test_case(&[0.6, 0.2, 0.4], 0.6 ; "all distinct")]
fn test_descriptive_stats_mode(values: &[f64], expected: f64) {
    let stats = DescriptiveStats::compute(ModelId::from("m"), values).unwrap();
    assert_eq!(stats.mode, expected);
}

proptest! {
    #[test]
    fn prop_descriptive_stats_bounds(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..50)) {
        let stats = DescriptiveStats::compute(ModelId::from("m"), &values).unwrap();

        prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
        prop_assert!(stats.min <= stats.mean + 1e-6 && stats.mean <= stats.max + 1e-6);
        prop_assert!(values.contains(&stats.mode));
        prop_assert_eq!(stats.count, values.len());
    }
}
