use model_compare_core::ModelId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    ShapiroWilk,
    Levene,
    Bartlett,
    Anova,
    TukeyHsd,
    KruskalWallis,
    MannWhitney,
    StudentT,
}

impl TestKind {
    /// What a `true` verdict means for this test.
    pub fn verdict_meaning(&self) -> &'static str {
        match self {
            TestKind::ShapiroWilk => "normal",
            TestKind::Levene | TestKind::Bartlett => "homoscedastic",
            TestKind::Anova
            | TestKind::TukeyHsd
            | TestKind::KruskalWallis
            | TestKind::MannWhitney
            | TestKind::StudentT => "significant",
        }
    }

    /// Assumption checks pass on `p >= alpha`; inferential tests reject on `p < alpha`.
    pub fn is_assumption_check(&self) -> bool {
        matches!(
            self,
            TestKind::ShapiroWilk | TestKind::Levene | TestKind::Bartlett
        )
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestKind::ShapiroWilk => "Shapiro-Wilk",
            TestKind::Levene => "Levene",
            TestKind::Bartlett => "Bartlett",
            TestKind::Anova => "ANOVA",
            TestKind::TukeyHsd => "Tukey HSD",
            TestKind::KruskalWallis => "Kruskal-Wallis",
            TestKind::MannWhitney => "Mann-Whitney",
            TestKind::StudentT => "Student's t-test",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a single-statistic test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub kind: TestKind,
    pub context: String,
    pub statistic: f64,
    pub p_value: f64,
    pub verdict: bool,
}

/// Outcome of a two-sample comparison between named models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairwiseTestResult {
    pub kind: TestKind,
    pub context: String,
    pub model_a: ModelId,
    pub model_b: ModelId,
    pub statistic: f64,
    pub p_value: f64,
    pub verdict: bool,
}

/// One Tukey HSD comparison. `mean_diff` is `mean(group_b) - mean(group_a)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TukeyPair {
    pub group_a: ModelId,
    pub group_b: ModelId,
    pub mean_diff: f64,
    pub std_err: f64,
    pub q_statistic: f64,
    pub p_value: f64,
    pub lower: f64,
    pub upper: f64,
    pub reject: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TukeyResult {
    pub context: String,
    pub q_crit: f64,
    pub df: f64,
    pub pairs: Vec<TukeyPair>,
}

impl TukeyResult {
    pub fn p_values(&self) -> Vec<f64> {
        self.pairs.iter().map(|p| p.p_value).collect()
    }

    pub fn rejects(&self) -> Vec<bool> {
        self.pairs.iter().map(|p| p.reject).collect()
    }

    pub fn mean_diffs(&self) -> Vec<f64> {
        self.pairs.iter().map(|p| p.mean_diff).collect()
    }

    pub fn any_rejected(&self) -> bool {
        self.pairs.iter().any(|p| p.reject)
    }
}
