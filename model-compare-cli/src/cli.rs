//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use model_compare_core::{HomogeneityTest, RankingPolicy, TaskKind};
use std::path::PathBuf;

use crate::commands::compare::CompareArgs;
use crate::output::OutputFormat;

/// Statistical comparison of models over resampled metric scores
#[derive(Debug, Parser)]
#[command(name = "model-compare", version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file layered over the default configuration
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare models on every metric of a scores file
    Compare(CompareArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum HomogeneityArg {
    Levene,
    Bartlett,
}

impl From<HomogeneityArg> for HomogeneityTest {
    fn from(arg: HomogeneityArg) -> Self {
        match arg {
            HomogeneityArg::Levene => HomogeneityTest::Levene,
            HomogeneityArg::Bartlett => HomogeneityTest::Bartlett,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RankingArg {
    /// Rank by median in every branch
    Median,
    /// Rank by mean when ANOVA found the difference
    MeanWhenParametric,
}

impl From<RankingArg> for RankingPolicy {
    fn from(arg: RankingArg) -> Self {
        match arg {
            RankingArg::Median => RankingPolicy::Median,
            RankingArg::MeanWhenParametric => RankingPolicy::MeanWhenParametric,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TaskArg {
    Classification,
    Regression,
}

impl From<TaskArg> for TaskKind {
    fn from(arg: TaskArg) -> Self {
        match arg {
            TaskArg::Classification => TaskKind::Classification,
            TaskArg::Regression => TaskKind::Regression,
        }
    }
}
