use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;

use super::ids::ModelId;
use crate::error::{CoreError, Result};

/// Summary of one model's observations for one metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DescriptiveStats {
    pub model_id: ModelId,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined for a single observation.
    pub std: Option<f64>,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub mode: f64,
}

impl DescriptiveStats {
    pub fn compute(model_id: ModelId, values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(CoreError::InsufficientData(format!(
                "cannot describe model '{}' without observations",
                model_id
            )));
        }

        let std = if values.len() > 1 {
            Some(Statistics::std_dev(values))
        } else {
            None
        };

        Ok(Self {
            model_id,
            count: values.len(),
            mean: Statistics::mean(values),
            std,
            median: median(values),
            min: Statistics::min(values),
            max: Statistics::max(values),
            mode: mode(values),
        })
    }
}

/// Median with the midpoint convention for even-length samples.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent value; ties go to the value seen first.
pub fn mode(values: &[f64]) -> f64 {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for v in values {
        *counts.entry(v.to_bits()).or_insert(0) += 1;
    }

    let mut best = f64::NAN;
    let mut best_count = 0;
    for v in values {
        let count = counts[&v.to_bits()];
        if count > best_count {
            best = *v;
            best_count = count;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_mode_prefers_first_on_tie() {
        assert_eq!(mode(&[2.0, 1.0, 1.0, 2.0]), 2.0);
        assert_eq!(mode(&[5.0, 3.0, 3.0]), 3.0);
    }

    #[test]
    fn test_compute_summary() {
        let stats = DescriptiveStats::compute(ModelId::from("m"), &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_relative_eq!(stats.mean, 2.5);
        assert_relative_eq!(stats.std.unwrap(), 1.2909944487358056, epsilon = 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mode, 1.0);
    }

    #[test]
    fn test_single_observation_has_no_std() {
        let stats = DescriptiveStats::compute(ModelId::from("m"), &[0.7]).unwrap();
        assert!(stats.std.is_none());
        assert_eq!(stats.median, 0.7);
    }

    #[test]
    fn test_empty_is_insufficient() {
        let err = DescriptiveStats::compute(ModelId::from("m"), &[]).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientData(_)));
    }
}
