//! CLI execution context

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Settings;
use crate::output::{OutputFormat, OutputWriter};

/// Execution context for CLI commands
pub struct Context {
    /// Settings resolved from files and environment
    pub settings: Settings,

    /// Output format
    pub output_format: OutputFormat,

    /// Output writer
    pub output: OutputWriter,
}

impl Context {
    /// Create a new context from CLI arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let settings = Settings::load(cli.config.as_deref())?;
        let output_format = cli.output;
        let output = OutputWriter::new(output_format, cli.no_color);

        Ok(Self {
            settings,
            output_format,
            output,
        })
    }
}
