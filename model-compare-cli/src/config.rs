//! CLI settings management

use anyhow::{Context as _, Result};
use config::{Config as ConfigLoader, Environment, File};
use directories::ProjectDirs;
use model_compare_core::{ComparisonConfig, FailurePolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::commands::compare::CompareArgs;

/// Default name of the folder reports are exported under
pub const DEFAULT_REPORT_NAME: &str = "model_comparison";

/// Resolved CLI settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Statistical comparison settings
    pub comparison: ComparisonConfig,

    /// Root directory for exported reports; no export when unset
    pub export_dir: Option<PathBuf>,

    /// Report folder name below the export directory
    pub report_name: String,

    /// Run metrics on the blocking thread pool
    pub concurrent: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            comparison: ComparisonConfig::default(),
            export_dir: None,
            report_name: DEFAULT_REPORT_NAME.to_string(),
            concurrent: false,
        }
    }
}

impl Settings {
    /// Layer built-in defaults, `config/default`, `config/local`, the user
    /// settings file, an explicit file and `MODEL_COMPARE_*` variables.
    ///
    /// Nested keys use a double underscore, e.g. `MODEL_COMPARE_COMPARISON__ALPHA`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(user) = Self::user_config_path() {
            builder = builder.add_source(File::from(user).required(false));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Settings file {:?} does not exist", path);
            }
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("MODEL_COMPARE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build settings")?;

        let settings: Settings = config
            .try_deserialize()
            .context("Failed to parse settings")?;

        tracing::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Per-user settings file, e.g. `~/.config/model-compare/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "model-compare", "model-compare")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Command-line flags take precedence over every settings source.
    pub fn apply_args(&mut self, args: &CompareArgs) {
        if let Some(alpha) = args.alpha {
            self.comparison.alpha = alpha;
        }
        if let Some(homogeneity) = args.homogeneity {
            self.comparison.homogeneity_test = homogeneity.into();
        }
        if let Some(ranking) = args.ranking {
            self.comparison.ranking = ranking.into();
        }
        if let Some(task) = args.task {
            self.comparison.task = Some(task.into());
        }
        if args.fail_fast {
            self.comparison.failure_policy = FailurePolicy::FailFast;
        }
        if let Some(ref dir) = args.export_dir {
            self.export_dir = Some(dir.clone());
        }
        if let Some(ref name) = args.report_name {
            self.report_name = name.clone();
        }
        if args.concurrent {
            self.concurrent = true;
        }
    }
}
