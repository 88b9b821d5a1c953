//! Output formatting for CLI

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use model_compare_core::DescriptiveStats;
use model_compare_pipeline::{AggregateReport, MetricVerdict, PipelineReport};
use model_compare_stats::{PairwiseTestResult, TestResult, TukeyResult};
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Compact format (single line per metric)
    Compact,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

/// Output writer that handles different formats
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format }
    }

    /// Write a single item
    pub fn write<T: Serialize + TableDisplay>(&self, item: &T) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                item.display_single();
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(item)?;
                println!("{}", json);
            }
            OutputFormat::Yaml => {
                let yaml = serde_yaml::to_string(item)?;
                print!("{}", yaml);
            }
            OutputFormat::Compact => {
                item.display_compact();
            }
        }
        Ok(())
    }

    /// Write a success message
    pub fn success(&self, message: &str) {
        if self.format == OutputFormat::Table {
            eprintln!("{} {}", "✓".green(), message);
        } else {
            eprintln!("{}", message);
        }
    }

    /// Write an error message
    pub fn error(&self, message: &str) {
        if self.format == OutputFormat::Table {
            eprintln!("{} {}", "✗".red(), message);
        } else {
            eprintln!("Error: {}", message);
        }
    }

    /// Write a warning message
    pub fn warning(&self, message: &str) {
        if self.format == OutputFormat::Table {
            eprintln!("{} {}", "⚠".yellow(), message);
        } else {
            eprintln!("Warning: {}", message);
        }
    }
}

/// Trait for displaying items in a table
pub trait TableDisplay {
    /// Convert item to a table row
    fn to_row(&self) -> Vec<Cell>;

    /// Display a single item in detail
    fn display_single(&self);

    /// Display in compact format
    fn display_compact(&self);
}

impl TableDisplay for MetricVerdict {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.metric_name),
            Cell::new(
                self.significance
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(
                self.best_model
                    .as_ref()
                    .map(|b| b.model_id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(
                self.best_model
                    .as_ref()
                    .map(|b| format!("{} {}", b.ranked_by, format_value(b.value)))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]
    }

    fn display_single(&self) {
        print_section(&format!("Verdict: {}", self.metric_name));
        println!("  {}", self.significance_message());
        println!("  {}", self.best_model_message());
    }

    fn display_compact(&self) {
        println!(
            "{}\t{}\t{}",
            self.metric_name,
            self.significance
                .map(|s| s.to_string())
                .unwrap_or_else(|| "not-significant".to_string()),
            self.best_model
                .as_ref()
                .map(|b| b.model_id.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

impl TableDisplay for AggregateReport {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::new(format_timestamp(&self.created_at)),
            Cell::new(self.verdicts.len()),
            Cell::new(self.failures.len()),
        ]
    }

    fn display_single(&self) {
        print_section("Model comparison");
        print_field("Created", &format_timestamp(&self.created_at));
        print_field("Metrics", &self.metric_count().to_string());

        for report in &self.per_metric {
            display_metric_report(report);
        }

        if !self.verdicts.is_empty() {
            print_section("Verdicts");
            let mut table = new_table(&["Metric", "Significant by", "Best model", "Ranked on"]);
            for verdict in &self.verdicts {
                table.add_row(verdict.to_row());
            }
            println!("{table}");
            println!();
            for (significance, best) in self
                .significance_messages
                .iter()
                .zip(&self.best_model_messages)
            {
                println!("  {}", significance);
                println!("  {}", best.bold());
            }
        }

        if !self.failures.is_empty() {
            print_section("Failed metrics");
            for failure in &self.failures {
                println!("  {} {}: {}", "✗".red(), failure.metric_name, failure.error);
            }
        }
    }

    fn display_compact(&self) {
        for verdict in &self.verdicts {
            verdict.display_compact();
        }
        for failure in &self.failures {
            println!("{}\tfailed\t{}", failure.metric_name, failure.error);
        }
    }
}

fn display_metric_report(report: &PipelineReport) {
    print_section(&format!("Metric: {}", report.metric_name()));
    print_field("Alpha", &report.alpha().to_string());

    let mut stats = new_table(&["Model", "N", "Mean", "Std", "Median", "Min", "Max", "Mode"]);
    for row in report.descriptive_stats() {
        stats.add_row(stats_row(row));
    }
    println!("{stats}");

    let mut tests = new_table(&["Test", "Context", "Statistic", "p-value", "Verdict"]);
    let single = report
        .shapiro()
        .iter()
        .chain(report.levene())
        .chain(report.bartlett())
        .chain(report.anova())
        .chain(report.kruskal());
    for result in single {
        tests.add_row(test_row(result));
    }
    for result in report.mann_whitney().iter().chain(report.t_student()) {
        tests.add_row(pairwise_row(result));
    }
    println!("{tests}");

    if let Some(tukey) = report.tukey() {
        println!("{}", tukey_table(tukey));
    }

    let trace: Vec<&str> = report.trace().iter().map(|s| s.as_tag()).collect();
    print_field("Trace", &trace.join(" → "));
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);
    table
}

fn stats_row(stats: &DescriptiveStats) -> Vec<Cell> {
    vec![
        Cell::new(&stats.model_id),
        Cell::new(stats.count),
        Cell::new(format_value(stats.mean)),
        Cell::new(stats.std.map(format_value).unwrap_or_else(|| "-".to_string())),
        Cell::new(format_value(stats.median)),
        Cell::new(format_value(stats.min)),
        Cell::new(format_value(stats.max)),
        Cell::new(format_value(stats.mode)),
    ]
}

fn test_row(result: &TestResult) -> Vec<Cell> {
    vec![
        Cell::new(result.kind),
        Cell::new(&result.context),
        Cell::new(format_value(result.statistic)),
        Cell::new(format_p_value(result.p_value)),
        verdict_cell(result.verdict, result.kind.verdict_meaning()),
    ]
}

fn pairwise_row(result: &PairwiseTestResult) -> Vec<Cell> {
    vec![
        Cell::new(result.kind),
        Cell::new(format!("{} vs {}", result.model_a, result.model_b)),
        Cell::new(format_value(result.statistic)),
        Cell::new(format_p_value(result.p_value)),
        verdict_cell(result.verdict, result.kind.verdict_meaning()),
    ]
}

fn tukey_table(tukey: &TukeyResult) -> Table {
    let mut table = new_table(&[
        "Group A", "Group B", "Mean diff", "Std err", "q", "p-adj", "Lower", "Upper", "Reject",
    ]);
    for pair in &tukey.pairs {
        table.add_row(vec![
            Cell::new(&pair.group_a),
            Cell::new(&pair.group_b),
            Cell::new(format_value(pair.mean_diff)),
            Cell::new(format_value(pair.std_err)),
            Cell::new(format_value(pair.q_statistic)),
            Cell::new(format_p_value(pair.p_value)),
            Cell::new(format_value(pair.lower)),
            Cell::new(format_value(pair.upper)),
            verdict_cell(pair.reject, "rejected"),
        ]);
    }
    table
}

fn verdict_cell(verdict: bool, meaning: &str) -> Cell {
    if verdict {
        Cell::new(meaning).fg(Color::Green)
    } else {
        Cell::new(format!("not {}", meaning)).fg(Color::Yellow)
    }
}

/// Print a key-value pair in detail format
pub fn print_field(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Format a timestamp for display
pub fn format_timestamp(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Four decimals, or scientific notation for very small magnitudes
pub fn format_value(value: f64) -> String {
    if value != 0.0 && value.abs() < 1e-4 {
        format!("{:.3e}", value)
    } else {
        format!("{:.4}", value)
    }
}

pub fn format_p_value(p: f64) -> String {
    if p < 1e-4 {
        "<0.0001".to_string()
    } else {
        format!("{:.4}", p)
    }
}
