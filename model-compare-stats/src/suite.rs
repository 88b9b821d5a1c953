use model_compare_core::{ModelId, Result, SignificanceLevel};

use crate::nonparametric::{kruskal_wallis, mann_whitney_u};
use crate::normality::shapiro_wilk;
use crate::parametric::{one_way_anova, student_t};
use crate::results::{PairwiseTestResult, TestKind, TestResult, TukeyResult};
use crate::tukey::tukey_hsd;
use crate::variance::{bartlett, levene};
use crate::RawStatistic;

/// The statistical tests used to compare models, each returning a verdict at
/// a shared significance level.
///
/// Assumption checks (Shapiro-Wilk, Levene, Bartlett) pass when `p >= alpha`.
/// Inferential tests report a significant difference when `p < alpha`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticalTestSuite {
    alpha: SignificanceLevel,
}

impl StatisticalTestSuite {
    pub fn new(alpha: SignificanceLevel) -> Self {
        Self { alpha }
    }

    pub fn alpha(&self) -> SignificanceLevel {
        self.alpha
    }

    fn verdict(&self, kind: TestKind, p_value: f64) -> bool {
        if kind.is_assumption_check() {
            self.alpha.is_consistent(p_value)
        } else {
            self.alpha.is_significant(p_value)
        }
    }

    fn finish(&self, kind: TestKind, context: String, raw: RawStatistic) -> TestResult {
        let verdict = self.verdict(kind, raw.p_value);
        tracing::debug!(
            "{} [{}]: statistic={:.6}, p={:.6}, {}={}",
            kind,
            context,
            raw.statistic,
            raw.p_value,
            kind.verdict_meaning(),
            verdict
        );
        TestResult {
            kind,
            context,
            statistic: raw.statistic,
            p_value: raw.p_value,
            verdict,
        }
    }

    fn finish_pairwise(
        &self,
        kind: TestKind,
        context: String,
        model_a: &ModelId,
        model_b: &ModelId,
        raw: RawStatistic,
    ) -> PairwiseTestResult {
        let verdict = self.verdict(kind, raw.p_value);
        tracing::debug!(
            "{} [{}] {} vs {}: statistic={:.6}, p={:.6}, significant={}",
            kind,
            context,
            model_a,
            model_b,
            raw.statistic,
            raw.p_value,
            verdict
        );
        PairwiseTestResult {
            kind,
            context,
            model_a: model_a.clone(),
            model_b: model_b.clone(),
            statistic: raw.statistic,
            p_value: raw.p_value,
            verdict,
        }
    }

    /// Shapiro-Wilk; verdict is `true` when the sample looks normal.
    pub fn shapiro(&self, context: impl Into<String>, values: &[f64]) -> Result<TestResult> {
        let raw = shapiro_wilk(values)?;
        Ok(self.finish(TestKind::ShapiroWilk, context.into(), raw))
    }

    /// Levene (median-centred); verdict is `true` when variances look equal.
    pub fn levene(&self, context: impl Into<String>, groups: &[&[f64]]) -> Result<TestResult> {
        let raw = levene(groups)?;
        Ok(self.finish(TestKind::Levene, context.into(), raw))
    }

    /// Bartlett; verdict is `true` when variances look equal.
    pub fn bartlett(&self, context: impl Into<String>, groups: &[&[f64]]) -> Result<TestResult> {
        let raw = bartlett(groups)?;
        Ok(self.finish(TestKind::Bartlett, context.into(), raw))
    }

    pub fn anova(&self, context: impl Into<String>, groups: &[&[f64]]) -> Result<TestResult> {
        let raw = one_way_anova(groups)?;
        Ok(self.finish(TestKind::Anova, context.into(), raw))
    }

    /// Tukey HSD over pooled `values` labelled by model.
    pub fn tukey(
        &self,
        context: impl Into<String>,
        values: &[f64],
        labels: &[ModelId],
    ) -> Result<TukeyResult> {
        let result = tukey_hsd(context, values, labels, self.alpha)?;
        tracing::debug!(
            "{} [{}]: {} pairs, {} rejected, q_crit={:.4}",
            TestKind::TukeyHsd,
            result.context,
            result.pairs.len(),
            result.pairs.iter().filter(|p| p.reject).count(),
            result.q_crit
        );
        Ok(result)
    }

    pub fn kruskal(&self, context: impl Into<String>, groups: &[&[f64]]) -> Result<TestResult> {
        let raw = kruskal_wallis(groups)?;
        Ok(self.finish(TestKind::KruskalWallis, context.into(), raw))
    }

    pub fn mann_whitney(
        &self,
        context: impl Into<String>,
        model_a: &ModelId,
        a: &[f64],
        model_b: &ModelId,
        b: &[f64],
    ) -> Result<PairwiseTestResult> {
        let raw = mann_whitney_u(a, b)?;
        Ok(self.finish_pairwise(TestKind::MannWhitney, context.into(), model_a, model_b, raw))
    }

    /// Two-sample t-test assuming equal variances.
    pub fn t_student(
        &self,
        context: impl Into<String>,
        model_a: &ModelId,
        a: &[f64],
        model_b: &ModelId,
        b: &[f64],
    ) -> Result<PairwiseTestResult> {
        let raw = student_t(a, b)?;
        Ok(self.finish_pairwise(TestKind::StudentT, context.into(), model_a, model_b, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_direction() {
        let suite = StatisticalTestSuite::new(SignificanceLevel::new(0.05).unwrap());
        assert!(suite.verdict(TestKind::ShapiroWilk, 0.05));
        assert!(!suite.verdict(TestKind::Anova, 0.05));
        assert!(suite.verdict(TestKind::Anova, 0.049));
        assert!(!suite.verdict(TestKind::Levene, 0.049));
    }
}
