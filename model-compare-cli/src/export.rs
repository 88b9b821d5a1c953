//! Report export to JSON files

use anyhow::{Context as _, Result};
use model_compare_pipeline::AggregateReport;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File holding the aggregate report inside an export folder
pub const GENERAL_REPORT_FILE: &str = "general_report.json";

const GENERAL_REPORT_STEM: &str = "general_report";

/// Writes reports to `<export_dir>/<report_name>/<YYYYmmddHHMMSS>/`.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    root: PathBuf,
}

impl ReportExporter {
    pub fn new(export_dir: &Path, report_name: &str) -> Self {
        Self {
            root: export_dir.join(report_name),
        }
    }

    /// Folder a report created at `report.created_at` is exported to.
    pub fn folder_for(&self, report: &AggregateReport) -> PathBuf {
        self.root
            .join(report.created_at.format("%Y%m%d%H%M%S").to_string())
    }

    /// Write one file per metric plus the general report; returns the folder.
    pub fn export(&self, report: &AggregateReport) -> Result<PathBuf> {
        let folder = self.folder_for(report);
        fs::create_dir_all(&folder)
            .with_context(|| format!("Failed to create export directory {:?}", folder))?;

        let names = metric_file_names(report.per_metric.iter().map(|r| r.metric_name().as_str()));
        for (metric_report, name) in report.per_metric.iter().zip(names) {
            write_json(&folder.join(name), metric_report)?;
        }
        write_json(&folder.join(GENERAL_REPORT_FILE), report)?;

        tracing::info!("Exported reports to {}", folder.display());
        Ok(folder)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}

/// Metric names become file names; path separators are not allowed in them.
fn file_stem(metric: &str) -> String {
    metric
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

/// One distinct `.json` file name per metric, in order. A stem already taken
/// (by the general report or an earlier metric) gets a `_2`, `_3`, ... suffix.
/// Names are compared case-insensitively.
fn metric_file_names<'a>(metrics: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::from([GENERAL_REPORT_STEM.to_string()]);
    let mut names = Vec::new();

    for metric in metrics {
        let base = file_stem(metric);
        let mut stem = base.clone();
        let mut n = 2;
        while !taken.insert(stem.to_lowercase()) {
            stem = format!("{}_{}", base, n);
            n += 1;
        }
        if stem != base {
            tracing::warn!("Metric '{}' is exported as {}.json to avoid a name clash", metric, stem);
        }
        names.push(format!("{}.json", stem));
    }
    names
}
