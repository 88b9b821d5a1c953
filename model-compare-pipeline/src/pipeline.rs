use model_compare_core::{
    CoreError, DescriptiveStats, HomogeneityTest, MetricName, Result, SampleSet, SignificanceLevel,
};
use model_compare_stats::{PairwiseTestResult, StatisticalTestSuite};

use crate::report::{Homogeneity, OmnibusBranch, PairwiseBranch, PipelineReport, TestOutcome};

const ALL_MODELS: &str = "all_models";

/// Picks and runs the tests for one metric based on the number of models and
/// the measured normality and homoscedasticity of their scores.
#[derive(Debug, Clone, Copy)]
pub struct TestSelectionPipeline<'a> {
    suite: &'a StatisticalTestSuite,
    homogeneity_test: HomogeneityTest,
}

impl<'a> TestSelectionPipeline<'a> {
    pub fn new(suite: &'a StatisticalTestSuite) -> Self {
        Self {
            suite,
            homogeneity_test: HomogeneityTest::default(),
        }
    }

    pub fn with_homogeneity(mut self, homogeneity_test: HomogeneityTest) -> Self {
        self.homogeneity_test = homogeneity_test;
        self
    }

    pub fn run(&self, metric_name: &MetricName, samples: &SampleSet) -> Result<PipelineReport> {
        if samples.len() < 2 {
            return Err(CoreError::Configuration(format!(
                "comparing models on '{}' needs at least 2 models, got {}",
                metric_name,
                samples.len()
            )));
        }

        tracing::info!(
            "Running test selection for metric '{}' over {} models",
            metric_name,
            samples.len()
        );

        let descriptive_stats = samples
            .iter()
            .map(|(id, values)| DescriptiveStats::compute(id.clone(), values))
            .collect::<Result<Vec<_>>>()?;

        let shapiro = samples
            .iter()
            .map(|(id, values)| self.suite.shapiro(format!("{}/{}", metric_name, id), values))
            .collect::<Result<Vec<_>>>()?;
        let all_normal = shapiro.iter().all(|r| r.verdict);
        tracing::info!("Normality for '{}': all_normal={}", metric_name, all_normal);

        let outcome = if samples.len() >= 3 {
            self.omnibus(metric_name, samples, all_normal)?
        } else {
            self.pairwise(metric_name, samples, all_normal)?
        };

        let report = PipelineReport::from_parts(
            metric_name.clone(),
            self.suite.alpha(),
            descriptive_stats,
            shapiro,
            outcome,
        );
        tracing::info!(
            "Finished '{}': {}",
            metric_name,
            report
                .trace()
                .iter()
                .map(|s| s.as_tag())
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        Ok(report)
    }

    fn homogeneity(&self, groups: &[&[f64]]) -> Result<Homogeneity> {
        let levene = self.suite.levene(ALL_MODELS, groups)?;

        match self.homogeneity_test {
            HomogeneityTest::Levene => {
                let bartlett = match self.suite.bartlett(ALL_MODELS, groups) {
                    Ok(result) => Some(result),
                    Err(e @ CoreError::InvalidInput(_)) => {
                        tracing::warn!("Skipping Bartlett, Levene decides: {}", e);
                        None
                    }
                    Err(e) => return Err(e),
                };
                Ok(Homogeneity::decided_by_levene(levene, bartlett))
            }
            HomogeneityTest::Bartlett => {
                let bartlett = self.suite.bartlett(ALL_MODELS, groups)?;
                Ok(Homogeneity::decided_by_bartlett(levene, bartlett))
            }
        }
    }

    fn omnibus(
        &self,
        metric_name: &MetricName,
        samples: &SampleSet,
        all_normal: bool,
    ) -> Result<TestOutcome> {
        let groups = samples.groups();
        let homogeneity = self.homogeneity(&groups)?;
        let homoscedastic = homogeneity.is_homoscedastic();

        let branch = if all_normal && homoscedastic {
            tracing::info!("'{}': parametric branch (ANOVA)", metric_name);
            let anova = self.suite.anova(ALL_MODELS, &groups)?;
            let tukey = if anova.verdict {
                let (values, labels) = samples.pooled();
                Some(self.suite.tukey(ALL_MODELS, &values, &labels)?)
            } else {
                None
            };
            OmnibusBranch::Parametric { anova, tukey }
        } else {
            tracing::info!(
                "'{}': non-parametric branch (Kruskal-Wallis), all_normal={}, homoscedastic={}",
                metric_name,
                all_normal,
                homoscedastic
            );
            let kruskal = self.suite.kruskal(ALL_MODELS, &groups)?;
            let mann_whitney = if kruskal.verdict {
                Some(self.mann_whitney_pairs(metric_name, samples)?)
            } else {
                None
            };
            OmnibusBranch::NonParametric {
                kruskal,
                mann_whitney,
            }
        };

        Ok(TestOutcome::Omnibus {
            homogeneity,
            branch,
        })
    }

    fn mann_whitney_pairs(
        &self,
        metric_name: &MetricName,
        samples: &SampleSet,
    ) -> Result<Vec<PairwiseTestResult>> {
        samples
            .pairs()
            .into_iter()
            .map(|(a, b)| {
                self.suite.mann_whitney(
                    format!("{}/{}_vs_{}", metric_name, a.id, b.id),
                    &a.id,
                    &a.scores,
                    &b.id,
                    &b.scores,
                )
            })
            .collect()
    }

    fn pairwise(
        &self,
        metric_name: &MetricName,
        samples: &SampleSet,
        all_normal: bool,
    ) -> Result<TestOutcome> {
        let pairs = samples.pairs();
        let (a, b) = pairs.first().ok_or_else(|| {
            CoreError::Configuration(format!("no model pair to compare on '{}'", metric_name))
        })?;
        let context = format!("{}/{}_vs_{}", metric_name, a.id, b.id);

        let branch = if all_normal {
            tracing::info!("'{}': two normal models, Student's t-test", metric_name);
            PairwiseBranch::StudentT(
                self.suite
                    .t_student(context, &a.id, &a.scores, &b.id, &b.scores)?,
            )
        } else {
            tracing::info!("'{}': two models, Mann-Whitney", metric_name);
            PairwiseBranch::MannWhitney(
                self.suite
                    .mann_whitney(context, &a.id, &a.scores, &b.id, &b.scores)?,
            )
        };

        Ok(TestOutcome::Pairwise(branch))
    }
}

/// Runs the default pipeline (Levene deciding) at `alpha`.
pub fn run_pipeline(
    metric_name: &MetricName,
    samples: &SampleSet,
    alpha: SignificanceLevel,
) -> Result<PipelineReport> {
    let suite = StatisticalTestSuite::new(alpha);
    TestSelectionPipeline::new(&suite).run(metric_name, samples)
}
