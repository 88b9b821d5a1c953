use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ids::{MetricName, ModelId};
use crate::error::{CoreError, Result};

/// Observations of one metric for one model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSamples {
    pub id: ModelId,
    pub scores: Vec<f64>,
}

/// Per-model samples of a single metric, in caller order.
///
/// Every model maps to a non-empty sequence and model ids are unique. The
/// insertion order is the model order used everywhere downstream (pairwise
/// comparisons, Tukey labels, report rows).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<ModelSamples>", into = "Vec<ModelSamples>")]
pub struct SampleSet {
    models: Vec<ModelSamples>,
}

impl SampleSet {
    pub fn new<I, M>(models: I) -> Result<Self>
    where
        I: IntoIterator<Item = (M, Vec<f64>)>,
        M: Into<ModelId>,
    {
        let models = models
            .into_iter()
            .map(|(id, scores)| ModelSamples {
                id: id.into(),
                scores,
            })
            .collect::<Vec<_>>();
        Self::from_models(models)
    }

    pub fn from_models(models: Vec<ModelSamples>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(models.len());
        for model in &models {
            if model.scores.is_empty() {
                return Err(CoreError::InsufficientData(format!(
                    "model '{}' has no observations",
                    model.id
                )));
            }
            if !seen.insert(&model.id) {
                return Err(CoreError::Configuration(format!(
                    "duplicate model id '{}'",
                    model.id
                )));
            }
        }

        Ok(Self { models })
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModelId, &[f64])> {
        self.models.iter().map(|m| (&m.id, m.scores.as_slice()))
    }

    pub fn model_ids(&self) -> impl Iterator<Item = &ModelId> {
        self.models.iter().map(|m| &m.id)
    }

    pub fn get(&self, id: &ModelId) -> Option<&[f64]> {
        self.models
            .iter()
            .find(|m| &m.id == id)
            .map(|m| m.scores.as_slice())
    }

    /// One slice per model, in model order.
    pub fn groups(&self) -> Vec<&[f64]> {
        self.models.iter().map(|m| m.scores.as_slice()).collect()
    }

    /// All observations concatenated, with the owning model id per observation.
    pub fn pooled(&self) -> (Vec<f64>, Vec<ModelId>) {
        let total = self.models.iter().map(|m| m.scores.len()).sum();
        let mut values = Vec::with_capacity(total);
        let mut labels = Vec::with_capacity(total);
        for model in &self.models {
            values.extend_from_slice(&model.scores);
            labels.extend(std::iter::repeat(model.id.clone()).take(model.scores.len()));
        }
        (values, labels)
    }

    /// Every unordered model pair `(i, j)` with `i < j`, in index order.
    pub fn pairs(&self) -> Vec<(&ModelSamples, &ModelSamples)> {
        let mut pairs = Vec::new();
        for i in 0..self.models.len() {
            for j in (i + 1)..self.models.len() {
                pairs.push((&self.models[i], &self.models[j]));
            }
        }
        pairs
    }
}

impl TryFrom<Vec<ModelSamples>> for SampleSet {
    type Error = CoreError;

    fn try_from(models: Vec<ModelSamples>) -> Result<Self> {
        Self::from_models(models)
    }
}

impl From<SampleSet> for Vec<ModelSamples> {
    fn from(set: SampleSet) -> Self {
        set.models
    }
}

/// Samples of one named metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSamples {
    pub name: MetricName,
    pub models: SampleSet,
}

/// Every requested metric's samples, in caller order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<MetricSamples>", into = "Vec<MetricSamples>")]
pub struct Scores {
    metrics: Vec<MetricSamples>,
}

impl Scores {
    pub fn new<I, N>(metrics: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, SampleSet)>,
        N: Into<MetricName>,
    {
        let metrics = metrics
            .into_iter()
            .map(|(name, models)| MetricSamples {
                name: name.into(),
                models,
            })
            .collect::<Vec<_>>();
        Self::from_metrics(metrics)
    }

    pub fn from_metrics(metrics: Vec<MetricSamples>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(metrics.len());
        for metric in &metrics {
            if !seen.insert(&metric.name) {
                return Err(CoreError::Configuration(format!(
                    "duplicate metric '{}'",
                    metric.name
                )));
            }
        }
        Ok(Self { metrics })
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricName, &SampleSet)> {
        self.metrics.iter().map(|m| (&m.name, &m.models))
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &MetricName> {
        self.metrics.iter().map(|m| &m.name)
    }

    pub fn get(&self, name: &MetricName) -> Option<&SampleSet> {
        self.metrics
            .iter()
            .find(|m| &m.name == name)
            .map(|m| &m.models)
    }
}

impl TryFrom<Vec<MetricSamples>> for Scores {
    type Error = CoreError;

    fn try_from(metrics: Vec<MetricSamples>) -> Result<Self> {
        Self::from_metrics(metrics)
    }
}

impl From<Scores> for Vec<MetricSamples> {
    fn from(scores: Scores) -> Self {
        scores.metrics
    }
}
