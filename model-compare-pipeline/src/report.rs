use model_compare_core::{DescriptiveStats, HomogeneityTest, MetricName, ModelId, SignificanceLevel};
use model_compare_stats::{PairwiseTestResult, TestResult, TukeyResult};
use serde::Serialize;
use std::fmt;

// ===== Trace =====

/// One decision recorded in a pipeline trace. Serialized with the tag strings
/// downstream report readers already match on.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum PipelineStep {
    #[serde(rename = "check_normality_with_shapiro")]
    CheckNormality,
    #[serde(rename = "3_or_more_models_is_true")]
    ThreeOrMoreModels,
    #[serde(rename = "3_or_more_models_is_false")]
    FewerThanThreeModels,
    #[serde(rename = "check_homocedasticity_with_levene_and_bartlett")]
    CheckHomoscedasticity,
    #[serde(rename = "data_normal_and_homocedasticity_is_true")]
    NormalAndHomoscedastic,
    #[serde(rename = "data_normal_and_homocedasticity_is_false")]
    NotNormalOrHeteroscedastic,
    #[serde(rename = "perform_anova")]
    PerformAnova,
    #[serde(rename = "anova_is_significant")]
    AnovaIsSignificant,
    #[serde(rename = "perform_turkey")]
    PerformTukey,
    #[serde(rename = "perform_kurskalwallis")]
    PerformKruskalWallis,
    #[serde(rename = "kurskalwallis_is_significant")]
    KruskalWallisIsSignificant,
    #[serde(rename = "perform_mannwhitney")]
    PerformMannWhitney,
    #[serde(rename = "data_normal_is_true")]
    DataNormal,
    #[serde(rename = "data_normal_is_false")]
    DataNotNormal,
    #[serde(rename = "perform_t_student")]
    PerformStudentT,
    #[serde(rename = "done")]
    Done,
}

impl PipelineStep {
    pub fn as_tag(&self) -> &'static str {
        match self {
            PipelineStep::CheckNormality => "check_normality_with_shapiro",
            PipelineStep::ThreeOrMoreModels => "3_or_more_models_is_true",
            PipelineStep::FewerThanThreeModels => "3_or_more_models_is_false",
            PipelineStep::CheckHomoscedasticity => "check_homocedasticity_with_levene_and_bartlett",
            PipelineStep::NormalAndHomoscedastic => "data_normal_and_homocedasticity_is_true",
            PipelineStep::NotNormalOrHeteroscedastic => "data_normal_and_homocedasticity_is_false",
            PipelineStep::PerformAnova => "perform_anova",
            PipelineStep::AnovaIsSignificant => "anova_is_significant",
            PipelineStep::PerformTukey => "perform_turkey",
            PipelineStep::PerformKruskalWallis => "perform_kurskalwallis",
            PipelineStep::KruskalWallisIsSignificant => "kurskalwallis_is_significant",
            PipelineStep::PerformMannWhitney => "perform_mannwhitney",
            PipelineStep::DataNormal => "data_normal_is_true",
            PipelineStep::DataNotNormal => "data_normal_is_false",
            PipelineStep::PerformStudentT => "perform_t_student",
            PipelineStep::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

// ===== Decision path =====

/// Variance-homogeneity results for three or more models. Both tests run;
/// `decided_by` names the one whose verdict chose the branch.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Homogeneity {
    levene: TestResult,
    bartlett: Option<TestResult>,
    decided_by: HomogeneityTest,
}

impl Homogeneity {
    pub fn decided_by_levene(levene: TestResult, bartlett: Option<TestResult>) -> Self {
        Self {
            levene,
            bartlett,
            decided_by: HomogeneityTest::Levene,
        }
    }

    pub fn decided_by_bartlett(levene: TestResult, bartlett: TestResult) -> Self {
        Self {
            levene,
            bartlett: Some(bartlett),
            decided_by: HomogeneityTest::Bartlett,
        }
    }

    pub fn levene(&self) -> &TestResult {
        &self.levene
    }

    /// `None` when Bartlett could not be evaluated (a zero-variance group) and
    /// Levene decided.
    pub fn bartlett(&self) -> Option<&TestResult> {
        self.bartlett.as_ref()
    }

    pub fn decided_by(&self) -> HomogeneityTest {
        self.decided_by
    }

    pub fn is_homoscedastic(&self) -> bool {
        match (self.decided_by, &self.bartlett) {
            (HomogeneityTest::Bartlett, Some(bartlett)) => bartlett.verdict,
            _ => self.levene.verdict,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "branch", rename_all = "snake_case")]
pub enum OmnibusBranch {
    /// All models normal and homoscedastic. `tukey` is present exactly when
    /// ANOVA was significant.
    Parametric {
        anova: TestResult,
        tukey: Option<TukeyResult>,
    },
    /// `mann_whitney` is present exactly when Kruskal-Wallis was significant,
    /// one result per unordered model pair.
    NonParametric {
        kruskal: TestResult,
        mann_whitney: Option<Vec<PairwiseTestResult>>,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "test", content = "result", rename_all = "snake_case")]
pub enum PairwiseBranch {
    StudentT(PairwiseTestResult),
    MannWhitney(PairwiseTestResult),
}

impl PairwiseBranch {
    pub fn result(&self) -> &PairwiseTestResult {
        match self {
            PairwiseBranch::StudentT(r) | PairwiseBranch::MannWhitney(r) => r,
        }
    }
}

/// The path the pipeline took through its decision tree.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    Omnibus {
        homogeneity: Homogeneity,
        branch: OmnibusBranch,
    },
    Pairwise(PairwiseBranch),
}

impl TestOutcome {
    pub fn trace(&self) -> Vec<PipelineStep> {
        let mut steps = vec![PipelineStep::CheckNormality];

        match self {
            TestOutcome::Omnibus { branch, .. } => {
                steps.push(PipelineStep::ThreeOrMoreModels);
                steps.push(PipelineStep::CheckHomoscedasticity);
                match branch {
                    OmnibusBranch::Parametric { tukey, .. } => {
                        steps.push(PipelineStep::NormalAndHomoscedastic);
                        steps.push(PipelineStep::PerformAnova);
                        if tukey.is_some() {
                            steps.push(PipelineStep::AnovaIsSignificant);
                            steps.push(PipelineStep::PerformTukey);
                        }
                    }
                    OmnibusBranch::NonParametric { mann_whitney, .. } => {
                        steps.push(PipelineStep::NotNormalOrHeteroscedastic);
                        steps.push(PipelineStep::PerformKruskalWallis);
                        if mann_whitney.is_some() {
                            steps.push(PipelineStep::KruskalWallisIsSignificant);
                            steps.push(PipelineStep::PerformMannWhitney);
                        }
                    }
                }
            }
            TestOutcome::Pairwise(pairwise) => {
                steps.push(PipelineStep::FewerThanThreeModels);
                match pairwise {
                    PairwiseBranch::StudentT(_) => {
                        steps.push(PipelineStep::DataNormal);
                        steps.push(PipelineStep::PerformStudentT);
                    }
                    PairwiseBranch::MannWhitney(_) => {
                        steps.push(PipelineStep::DataNotNormal);
                        steps.push(PipelineStep::PerformMannWhitney);
                    }
                }
            }
        }

        steps.push(PipelineStep::Done);
        steps
    }
}

// ===== Report =====

/// Everything one pipeline run produced for a single metric.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PipelineReport {
    metric_name: MetricName,
    alpha: SignificanceLevel,
    descriptive_stats: Vec<DescriptiveStats>,
    shapiro: Vec<TestResult>,
    outcome: TestOutcome,
    trace: Vec<PipelineStep>,
}

impl PipelineReport {
    pub fn from_parts(
        metric_name: MetricName,
        alpha: SignificanceLevel,
        descriptive_stats: Vec<DescriptiveStats>,
        shapiro: Vec<TestResult>,
        outcome: TestOutcome,
    ) -> Self {
        let trace = outcome.trace();
        Self {
            metric_name,
            alpha,
            descriptive_stats,
            shapiro,
            outcome,
            trace,
        }
    }

    pub fn metric_name(&self) -> &MetricName {
        &self.metric_name
    }

    pub fn alpha(&self) -> SignificanceLevel {
        self.alpha
    }

    pub fn descriptive_stats(&self) -> &[DescriptiveStats] {
        &self.descriptive_stats
    }

    pub fn shapiro(&self) -> &[TestResult] {
        &self.shapiro
    }

    pub fn outcome(&self) -> &TestOutcome {
        &self.outcome
    }

    pub fn trace(&self) -> &[PipelineStep] {
        &self.trace
    }

    pub fn all_normal(&self) -> bool {
        self.shapiro.iter().all(|r| r.verdict)
    }

    fn homogeneity(&self) -> Option<&Homogeneity> {
        match &self.outcome {
            TestOutcome::Omnibus { homogeneity, .. } => Some(homogeneity),
            TestOutcome::Pairwise(_) => None,
        }
    }

    pub fn levene(&self) -> Option<&TestResult> {
        self.homogeneity().map(Homogeneity::levene)
    }

    pub fn bartlett(&self) -> Option<&TestResult> {
        self.homogeneity().and_then(Homogeneity::bartlett)
    }

    pub fn anova(&self) -> Option<&TestResult> {
        match &self.outcome {
            TestOutcome::Omnibus {
                branch: OmnibusBranch::Parametric { anova, .. },
                ..
            } => Some(anova),
            _ => None,
        }
    }

    pub fn tukey(&self) -> Option<&TukeyResult> {
        match &self.outcome {
            TestOutcome::Omnibus {
                branch: OmnibusBranch::Parametric { tukey, .. },
                ..
            } => tukey.as_ref(),
            _ => None,
        }
    }

    pub fn kruskal(&self) -> Option<&TestResult> {
        match &self.outcome {
            TestOutcome::Omnibus {
                branch: OmnibusBranch::NonParametric { kruskal, .. },
                ..
            } => Some(kruskal),
            _ => None,
        }
    }

    /// Post-hoc pairs after a significant Kruskal-Wallis, or the single
    /// two-model comparison.
    pub fn mann_whitney(&self) -> &[PairwiseTestResult] {
        match &self.outcome {
            TestOutcome::Omnibus {
                branch:
                    OmnibusBranch::NonParametric {
                        mann_whitney: Some(pairs),
                        ..
                    },
                ..
            } => pairs,
            TestOutcome::Pairwise(PairwiseBranch::MannWhitney(result)) => {
                std::slice::from_ref(result)
            }
            _ => &[],
        }
    }

    pub fn t_student(&self) -> Option<&PairwiseTestResult> {
        match &self.outcome {
            TestOutcome::Pairwise(PairwiseBranch::StudentT(result)) => Some(result),
            _ => None,
        }
    }

    pub fn stats_for(&self, model_id: &ModelId) -> Option<&DescriptiveStats> {
        self.descriptive_stats.iter().find(|s| &s.model_id == model_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_compare_stats::TestKind;

    fn result(kind: TestKind, verdict: bool) -> TestResult {
        TestResult {
            kind,
            context: "all_models".to_string(),
            statistic: 1.0,
            p_value: if verdict { 0.5 } else { 0.01 },
            verdict,
        }
    }

    #[test]
    fn test_tags_round_trip_through_serde() {
        let json = serde_json::to_string(&PipelineStep::PerformTukey).unwrap();
        assert_eq!(json, "\"perform_turkey\"");
        assert_eq!(PipelineStep::PerformTukey.as_tag(), "perform_turkey");
        assert_eq!(PipelineStep::Done.to_string(), "done");
    }

    #[test]
    fn test_non_significant_parametric_trace() {
        let outcome = TestOutcome::Omnibus {
            homogeneity: Homogeneity::decided_by_levene(result(TestKind::Levene, true), None),
            branch: OmnibusBranch::Parametric {
                anova: result(TestKind::Anova, false),
                tukey: None,
            },
        };

        assert_eq!(
            outcome.trace(),
            vec![
                PipelineStep::CheckNormality,
                PipelineStep::ThreeOrMoreModels,
                PipelineStep::CheckHomoscedasticity,
                PipelineStep::NormalAndHomoscedastic,
                PipelineStep::PerformAnova,
                PipelineStep::Done,
            ]
        );
    }

    #[test]
    fn test_homogeneity_decider() {
        let levene_ok = result(TestKind::Levene, true);
        let bartlett_bad = result(TestKind::Bartlett, false);

        let by_levene = Homogeneity::decided_by_levene(levene_ok.clone(), Some(bartlett_bad.clone()));
        assert!(by_levene.is_homoscedastic());

        let by_bartlett = Homogeneity::decided_by_bartlett(levene_ok, bartlett_bad);
        assert!(!by_bartlett.is_homoscedastic());
        assert_eq!(by_bartlett.decided_by(), HomogeneityTest::Bartlett);
    }
}
