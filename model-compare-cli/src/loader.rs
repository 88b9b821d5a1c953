//! Scores file loading
//!
//! A scores file lists, per metric, the resampled scores of every model:
//!
//! ```json
//! { "metrics": [ { "name": "accuracy", "models": [ { "id": "0", "scores": [0.71, 0.69] } ] } ] }
//! ```
//!
//! The same shape is accepted as YAML or TOML, chosen by file extension.

use model_compare_core::{CoreError, Result, ScoreSource, Scores};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Serialization format of a scores file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoresFormat {
    Json,
    Yaml,
    Toml,
}

impl ScoresFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(CoreError::InvalidInput(format!(
                "unsupported scores file {:?}: expected a .json, .yaml, .yml or .toml extension",
                path
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ScoresDocument {
    metrics: Scores,
}

/// Parse scores from text in the given format.
pub fn parse_scores(content: &str, format: ScoresFormat) -> Result<Scores> {
    let document: ScoresDocument = match format {
        ScoresFormat::Json => serde_json::from_str(content)?,
        ScoresFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| CoreError::Serialization(e.to_string()))?,
        ScoresFormat::Toml => {
            toml::from_str(content).map_err(|e| CoreError::Serialization(e.to_string()))?
        }
    };
    Ok(document.metrics)
}

/// A scores file on disk
#[derive(Debug, Clone)]
pub struct ScoresFile {
    path: PathBuf,
}

impl ScoresFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreSource for ScoresFile {
    fn load_scores(&self) -> Result<Scores> {
        let format = ScoresFormat::from_path(&self.path)?;
        let content = fs::read_to_string(&self.path).map_err(|e| {
            CoreError::InvalidInput(format!("failed to read {:?}: {}", self.path, e))
        })?;

        let scores = parse_scores(&content, format)?;
        tracing::info!(
            "Loaded {} metrics from {}",
            scores.len(),
            self.path.display()
        );
        Ok(scores)
    }
}
