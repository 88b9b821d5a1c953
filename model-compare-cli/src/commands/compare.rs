//! Compare command

use anyhow::{Context as _, Result};
use clap::Args;
use comfy_table::Cell;
use model_compare_core::{MetricName, ScoreSource};
use model_compare_pipeline::{AggregateReport, BatchRunner, BestModel};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::{HomogeneityArg, RankingArg, TaskArg};
use crate::context::Context;
use crate::export::ReportExporter;
use crate::loader::ScoresFile;
use crate::output::{format_value, print_field, print_section, TableDisplay};

/// Compare models on every metric of a scores file
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Scores file (.json, .yaml, .yml or .toml)
    pub scores_file: PathBuf,

    /// Significance level, strictly between 0 and 1
    #[arg(short, long)]
    pub alpha: Option<f64>,

    /// Variance-homogeneity test deciding the parametric branch
    #[arg(long, value_enum)]
    pub homogeneity: Option<HomogeneityArg>,

    /// Statistic used to rank models
    #[arg(long, value_enum)]
    pub ranking: Option<RankingArg>,

    /// Task kind the metrics must belong to
    #[arg(long, value_enum)]
    pub task: Option<TaskArg>,

    /// Abort on the first failing metric instead of skipping it
    #[arg(long)]
    pub fail_fast: bool,

    /// Only report the best model (requires exactly one metric)
    #[arg(long)]
    pub best: bool,

    /// Export JSON reports below this directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Report folder name below the export directory
    #[arg(long)]
    pub report_name: Option<String>,

    /// Run metrics concurrently
    #[arg(long)]
    pub concurrent: bool,
}

pub async fn execute(ctx: &Context, args: CompareArgs) -> Result<()> {
    let mut settings = ctx.settings.clone();
    settings.apply_args(&args);

    let runner = BatchRunner::new(&settings.comparison).context("Invalid comparison settings")?;
    let source = ScoresFile::new(args.scores_file.clone());
    let scores = source
        .load_scores()
        .with_context(|| format!("Failed to load scores from {:?}", source.path()))?;

    let report = if settings.concurrent {
        runner.run_all_concurrent(&scores).await?
    } else {
        runner.run_all(&scores)?
    };

    if args.best {
        ctx.output.write(&BestModelDisplay::from_report(&report)?)?;
    } else {
        ctx.output.write(&report)?;
    }

    if !report.failures.is_empty() {
        ctx.output.warning(&format!(
            "{} of {} metrics failed and were skipped",
            report.failures.len(),
            report.metric_count()
        ));
    }

    if let Some(ref dir) = settings.export_dir {
        let folder = ReportExporter::new(dir, &settings.report_name).export(&report)?;
        ctx.output
            .success(&format!("Reports exported to {}", folder.display()));
    }

    Ok(())
}

/// Best model of a single-metric comparison
#[derive(Debug, Serialize)]
struct BestModelDisplay {
    metric_name: MetricName,
    best_model: Option<BestModel>,
    message: String,
}

impl BestModelDisplay {
    fn from_report(report: &AggregateReport) -> Result<Self> {
        let best_model = report.single_best_model()?.cloned();
        let verdict = report
            .verdicts
            .first()
            .context("Comparison produced no verdict")?;

        Ok(Self {
            metric_name: verdict.metric_name.clone(),
            best_model,
            message: verdict.best_model_message(),
        })
    }
}

impl TableDisplay for BestModelDisplay {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.metric_name),
            Cell::new(
                self.best_model
                    .as_ref()
                    .map(|b| b.model_id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]
    }

    fn display_single(&self) {
        print_section("Best model");
        print_field("Metric", self.metric_name.as_str());
        match &self.best_model {
            Some(best) => {
                print_field("Model", best.model_id.as_str());
                print_field(&best.ranked_by.to_string(), &format_value(best.value));
            }
            None => print_field("Model", "-"),
        }
        println!("\n  {}", self.message);
    }

    fn display_compact(&self) {
        match &self.best_model {
            Some(best) => println!("{}\t{}", self.metric_name, best.model_id),
            None => println!("{}\t-", self.metric_name),
        }
    }
}
