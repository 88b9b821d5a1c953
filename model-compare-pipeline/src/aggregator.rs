use chrono::{DateTime, Utc};
use model_compare_core::{CoreError, DescriptiveStats, MetricName, ModelId, RankingPolicy, Result};
use model_compare_stats::PairwiseTestResult;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::report::{OmnibusBranch, PairwiseBranch, PipelineReport, TestOutcome};

// ===== Verdict types =====

/// Which test established a significant difference.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceSource {
    Anova,
    KruskalWallis,
    StudentT,
    MannWhitney,
}

impl fmt::Display for SignificanceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignificanceSource::Anova => "ANOVA",
            SignificanceSource::KruskalWallis => "Kruskal-Wallis",
            SignificanceSource::StudentT => "Student's t-test",
            SignificanceSource::MannWhitney => "Mann-Whitney",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RankingStatistic {
    Median,
    Mean,
}

impl RankingStatistic {
    fn of(&self, stats: &DescriptiveStats) -> f64 {
        match self {
            RankingStatistic::Median => stats.median,
            RankingStatistic::Mean => stats.mean,
        }
    }
}

impl fmt::Display for RankingStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingStatistic::Median => f.write_str("median"),
            RankingStatistic::Mean => f.write_str("mean"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BestModel {
    pub model_id: ModelId,
    pub ranked_by: RankingStatistic,
    pub value: f64,
}

/// Why a metric has no best model.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoBestReason {
    NotSignificant,
    NoSignificantPair,
}

impl fmt::Display for NoBestReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoBestReason::NotSignificant => f.write_str("due to lack of significance"),
            NoBestReason::NoSignificantPair => f.write_str("no pairwise comparison was significant"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricVerdict {
    pub metric_name: MetricName,
    pub significance: Option<SignificanceSource>,
    pub best_model: Option<BestModel>,
}

impl MetricVerdict {
    /// Why `best_model` is absent, if it is.
    pub fn no_best_reason(&self) -> Option<NoBestReason> {
        match (&self.best_model, self.significance) {
            (Some(_), _) => None,
            (None, None) => Some(NoBestReason::NotSignificant),
            (None, Some(_)) => Some(NoBestReason::NoSignificantPair),
        }
    }

    pub fn significance_message(&self) -> String {
        match self.significance {
            Some(source) => format!(
                "Significant difference detected between models ({}) for {}.",
                source, self.metric_name
            ),
            None => format!(
                "No significant difference detected between models for {}.",
                self.metric_name
            ),
        }
    }

    pub fn best_model_message(&self) -> String {
        match (&self.best_model, self.no_best_reason()) {
            (Some(best), _) => format!(
                "Best model based on {}: {} with {} {} for {}.",
                best.ranked_by, best.model_id, best.ranked_by, best.value, self.metric_name
            ),
            (None, reason) => format!(
                "No model is distinguishable as best for {} ({}).",
                self.metric_name,
                reason.unwrap_or(NoBestReason::NotSignificant)
            ),
        }
    }
}

impl fmt::Display for MetricVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.significance_message(), self.best_model_message())
    }
}

// ===== Aggregation =====

/// A metric whose pipeline failed and was left out of the aggregate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricFailure {
    pub metric_name: MetricName,
    #[serde(serialize_with = "serialize_error")]
    pub error: CoreError,
}

fn serialize_error<S: Serializer>(error: &CoreError, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&error.to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub created_at: DateTime<Utc>,
    pub per_metric: Vec<PipelineReport>,
    pub verdicts: Vec<MetricVerdict>,
    pub best_model_messages: Vec<String>,
    pub significance_messages: Vec<String>,
    pub failures: Vec<MetricFailure>,
}

impl AggregateReport {
    pub fn verdict_for(&self, metric_name: &MetricName) -> Option<&MetricVerdict> {
        self.verdicts.iter().find(|v| &v.metric_name == metric_name)
    }

    pub fn report_for(&self, metric_name: &MetricName) -> Option<&PipelineReport> {
        self.per_metric
            .iter()
            .find(|r| r.metric_name() == metric_name)
    }

    pub fn metric_count(&self) -> usize {
        self.verdicts.len() + self.failures.len()
    }

    /// The best model of a single-metric comparison. A best model across
    /// several metrics is undefined.
    pub fn single_best_model(&self) -> Result<Option<&BestModel>> {
        if self.metric_count() != 1 {
            return Err(CoreError::Configuration(format!(
                "a single best model needs exactly one metric, got {}",
                self.metric_count()
            )));
        }

        if let Some(failure) = self.failures.first() {
            return Err(CoreError::for_metric(
                failure.metric_name.as_str(),
                failure.error.clone(),
            ));
        }

        Ok(self.verdicts.first().and_then(|v| v.best_model.as_ref()))
    }
}

/// Turns pipeline reports into per-metric verdicts and messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator {
    ranking: RankingPolicy,
}

impl ResultAggregator {
    pub fn new(ranking: RankingPolicy) -> Self {
        Self { ranking }
    }

    pub fn verdict(&self, report: &PipelineReport) -> MetricVerdict {
        let metric_name = report.metric_name().clone();

        let (significance, best_model) = match report.outcome() {
            TestOutcome::Omnibus {
                branch: OmnibusBranch::Parametric { anova, .. },
                ..
            } if anova.verdict => {
                let statistic = match self.ranking {
                    RankingPolicy::Median => RankingStatistic::Median,
                    RankingPolicy::MeanWhenParametric => RankingStatistic::Mean,
                };
                (
                    Some(SignificanceSource::Anova),
                    best_overall(report.descriptive_stats(), statistic),
                )
            }
            TestOutcome::Omnibus {
                branch:
                    OmnibusBranch::NonParametric {
                        kruskal,
                        mann_whitney: Some(pairs),
                    },
                ..
            } if kruskal.verdict => (
                Some(SignificanceSource::KruskalWallis),
                best_from_pairs(report, pairs),
            ),
            TestOutcome::Pairwise(branch) if branch.result().verdict => {
                let source = match branch {
                    PairwiseBranch::StudentT(_) => SignificanceSource::StudentT,
                    PairwiseBranch::MannWhitney(_) => SignificanceSource::MannWhitney,
                };
                (
                    Some(source),
                    best_from_pairs(report, std::slice::from_ref(branch.result())),
                )
            }
            _ => (None, None),
        };

        let verdict = MetricVerdict {
            metric_name,
            significance,
            best_model,
        };
        tracing::info!("{}", verdict);
        verdict
    }

    pub fn aggregate(
        &self,
        reports: Vec<PipelineReport>,
        failures: Vec<MetricFailure>,
    ) -> AggregateReport {
        let verdicts: Vec<MetricVerdict> = reports.iter().map(|r| self.verdict(r)).collect();
        let significance_messages = verdicts.iter().map(|v| v.significance_message()).collect();
        let best_model_messages = verdicts.iter().map(|v| v.best_model_message()).collect();

        AggregateReport {
            created_at: Utc::now(),
            per_metric: reports,
            verdicts,
            best_model_messages,
            significance_messages,
            failures,
        }
    }
}

/// Highest statistic over all models; ties keep the earlier model.
fn best_overall(stats: &[DescriptiveStats], statistic: RankingStatistic) -> Option<BestModel> {
    let mut best: Option<&DescriptiveStats> = None;
    for candidate in stats {
        match best {
            Some(current) if statistic.of(candidate) > statistic.of(current) => best = Some(candidate),
            None => best = Some(candidate),
            _ => {}
        }
    }

    best.map(|s| BestModel {
        model_id: s.model_id.clone(),
        ranked_by: statistic,
        value: statistic.of(s),
    })
}

/// Winner of each significant pair by median (equal medians go to the second
/// model), then the highest median among the winners.
fn best_from_pairs(
    report: &PipelineReport,
    pairs: &[PairwiseTestResult],
) -> Option<BestModel> {
    let mut best: Option<&DescriptiveStats> = None;

    for pair in pairs.iter().filter(|p| p.verdict) {
        let (Some(a), Some(b)) = (report.stats_for(&pair.model_a), report.stats_for(&pair.model_b))
        else {
            continue;
        };
        let winner = if a.median > b.median { a } else { b };

        match best {
            Some(current) if winner.median > current.median => best = Some(winner),
            None => best = Some(winner),
            _ => {}
        }
    }

    best.map(|s| BestModel {
        model_id: s.model_id.clone(),
        ranked_by: RankingStatistic::Median,
        value: s.median,
    })
}
