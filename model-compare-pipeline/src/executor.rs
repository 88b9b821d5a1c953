use model_compare_core::{
    ComparisonConfig, CoreError, FailurePolicy, HomogeneityTest, MetricName, Result, SampleSet,
    ScoreSource, Scores, TaskKind,
};
use model_compare_stats::StatisticalTestSuite;

use crate::aggregator::{AggregateReport, MetricFailure, ResultAggregator};
use crate::pipeline::TestSelectionPipeline;
use crate::report::PipelineReport;

/// Runs the test-selection pipeline for every metric of a [`Scores`] and
/// aggregates the reports.
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    suite: StatisticalTestSuite,
    homogeneity_test: HomogeneityTest,
    aggregator: ResultAggregator,
    failure_policy: FailurePolicy,
    task: Option<TaskKind>,
}

impl BatchRunner {
    pub fn new(config: &ComparisonConfig) -> Result<Self> {
        Ok(Self {
            suite: StatisticalTestSuite::new(config.significance_level()?),
            homogeneity_test: config.homogeneity_test,
            aggregator: ResultAggregator::new(config.ranking),
            failure_policy: config.failure_policy,
            task: config.task,
        })
    }

    pub fn suite(&self) -> &StatisticalTestSuite {
        &self.suite
    }

    fn check_task(&self, scores: &Scores) -> Result<()> {
        let Some(task) = self.task else {
            return Ok(());
        };
        task.validate_metrics(scores.metric_names())?;
        for metric in scores.metric_names().filter(|m| !task.supports(m)) {
            tracing::warn!("Metric '{}' is not a usual {} metric", metric, task);
        }
        Ok(())
    }

    fn run_metric(
        suite: &StatisticalTestSuite,
        homogeneity_test: HomogeneityTest,
        metric_name: &MetricName,
        samples: &SampleSet,
    ) -> Result<PipelineReport> {
        TestSelectionPipeline::new(suite)
            .with_homogeneity(homogeneity_test)
            .run(metric_name, samples)
    }

    /// Applies the failure policy to one metric's outcome.
    fn collect(
        &self,
        metric_name: &MetricName,
        outcome: Result<PipelineReport>,
        reports: &mut Vec<PipelineReport>,
        failures: &mut Vec<MetricFailure>,
    ) -> Result<()> {
        match outcome {
            Ok(report) => reports.push(report),
            Err(e) => match self.failure_policy {
                FailurePolicy::FailFast => {
                    tracing::error!("Metric '{}' failed, aborting batch: {}", metric_name, e);
                    return Err(CoreError::for_metric(metric_name.as_str(), e));
                }
                FailurePolicy::Isolate => {
                    tracing::warn!("Metric '{}' failed and is skipped: {}", metric_name, e);
                    failures.push(MetricFailure {
                        metric_name: metric_name.clone(),
                        error: e,
                    });
                }
            },
        }
        Ok(())
    }

    /// Processes metrics one after another in iteration order.
    pub fn run_all(&self, scores: &Scores) -> Result<AggregateReport> {
        self.check_task(scores)?;
        tracing::info!("Comparing models over {} metrics", scores.len());

        let mut reports = Vec::with_capacity(scores.len());
        let mut failures = Vec::new();

        for (metric_name, samples) in scores.iter() {
            let outcome = Self::run_metric(&self.suite, self.homogeneity_test, metric_name, samples);
            self.collect(metric_name, outcome, &mut reports, &mut failures)?;
        }

        Ok(self.aggregator.aggregate(reports, failures))
    }

    pub fn run_source<S: ScoreSource + ?Sized>(&self, source: &S) -> Result<AggregateReport> {
        let scores = source.load_scores()?;
        self.run_all(&scores)
    }

    /// Runs each metric on the blocking pool and joins in iteration order, so
    /// the result matches [`BatchRunner::run_all`].
    pub async fn run_all_concurrent(&self, scores: &Scores) -> Result<AggregateReport> {
        self.check_task(scores)?;
        tracing::info!(
            "Comparing models over {} metrics concurrently",
            scores.len()
        );

        let handles: Vec<_> = scores
            .iter()
            .map(|(metric_name, samples)| {
                let task_metric = metric_name.clone();
                let samples = samples.clone();
                let suite = self.suite;
                let homogeneity_test = self.homogeneity_test;
                let handle = tokio::task::spawn_blocking(move || {
                    Self::run_metric(&suite, homogeneity_test, &task_metric, &samples)
                });
                (metric_name.clone(), handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        let mut failures = Vec::new();

        for (metric_name, handle) in handles {
            let outcome = task_outcome(handle.await);
            self.collect(&metric_name, outcome, &mut reports, &mut failures)?;
        }

        Ok(self.aggregator.aggregate(reports, failures))
    }
}

/// A task that panicked or was cancelled counts as a failed metric.
fn task_outcome(
    joined: std::result::Result<Result<PipelineReport>, tokio::task::JoinError>,
) -> Result<PipelineReport> {
    joined.unwrap_or_else(|e| Err(CoreError::Internal(format!("pipeline task failed: {}", e))))
}
