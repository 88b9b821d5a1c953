use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::ids::MetricName;
use crate::error::{CoreError, Result};

pub const DEFAULT_ALPHA: f64 = 0.05;

// ===== Significance Level =====

/// Significance level `alpha`, strictly inside `(0, 1)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct SignificanceLevel(f64);

impl SignificanceLevel {
    pub fn new(alpha: f64) -> Result<Self> {
        if alpha.is_finite() && alpha > 0.0 && alpha < 1.0 {
            Ok(Self(alpha))
        } else {
            Err(CoreError::Configuration(format!(
                "alpha must lie strictly between 0 and 1, got {}",
                alpha
            )))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// `p < alpha`. A p-value equal to alpha is not significant.
    pub fn is_significant(&self, p_value: f64) -> bool {
        p_value < self.0
    }

    /// `p >= alpha`: failing to reject the assumption under test.
    pub fn is_consistent(&self, p_value: f64) -> bool {
        p_value >= self.0
    }
}

impl Default for SignificanceLevel {
    fn default() -> Self {
        Self(DEFAULT_ALPHA)
    }
}

impl TryFrom<f64> for SignificanceLevel {
    type Error = CoreError;

    fn try_from(alpha: f64) -> Result<Self> {
        Self::new(alpha)
    }
}

impl From<SignificanceLevel> for f64 {
    fn from(level: SignificanceLevel) -> Self {
        level.0
    }
}

impl fmt::Display for SignificanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ===== Pipeline Policies =====

/// Which variance-homogeneity test decides between the parametric and
/// non-parametric branches.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HomogeneityTest {
    #[default]
    Levene,
    Bartlett,
}

/// Statistic used to rank models once significance is established.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Median in every branch.
    #[default]
    Median,
    /// Mean when ANOVA found the difference, median otherwise.
    MeanWhenParametric,
}

/// What a batch does when one metric's pipeline fails.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and keep processing the remaining metrics.
    #[default]
    Isolate,
    /// Abort the batch on the first failing metric.
    FailFast,
}

// ===== Task Kind =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Classification,
    Regression,
}

impl TaskKind {
    pub const CLASSIFICATION_METRICS: &'static [&'static str] =
        &["accuracy", "f1", "precision", "recall"];
    pub const REGRESSION_METRICS: &'static [&'static str] = &["mae", "mse", "r2"];

    pub fn supported_metrics(&self) -> &'static [&'static str] {
        match self {
            TaskKind::Classification => Self::CLASSIFICATION_METRICS,
            TaskKind::Regression => Self::REGRESSION_METRICS,
        }
    }

    pub fn supports(&self, metric: &MetricName) -> bool {
        self.supported_metrics().contains(&metric.as_str())
    }

    /// Rejects a request in which no metric belongs to this task.
    pub fn validate_metrics<'a, I>(&self, metrics: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a MetricName>,
    {
        let metrics: Vec<&MetricName> = metrics.into_iter().collect();
        if metrics.iter().any(|m| self.supports(m)) {
            return Ok(());
        }
        Err(CoreError::Configuration(format!(
            "metrics must be chosen among {:?} for {} models",
            self.supported_metrics(),
            self
        )))
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Classification => write!(f, "classification"),
            TaskKind::Regression => write!(f, "regression"),
        }
    }
}

// ===== Comparison Configuration =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ComparisonConfig {
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub homogeneity_test: HomogeneityTest,
    #[serde(default)]
    pub ranking: RankingPolicy,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub task: Option<TaskKind>,
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            homogeneity_test: HomogeneityTest::default(),
            ranking: RankingPolicy::default(),
            failure_policy: FailurePolicy::default(),
            task: None,
        }
    }
}

impl ComparisonConfig {
    pub fn significance_level(&self) -> Result<SignificanceLevel> {
        self.validate()?;
        SignificanceLevel::new(self.alpha)
    }
}
