//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Every flag is optional: with no arguments
//! the tool reads `Urban.xlsx` and writes charts to the working directory.

use clap::Parser;
use std::path::PathBuf;

/// Edustat - parental education vs. student grades
///
/// Loads a survey workbook, groups students by parental education,
/// prints descriptive statistics, one-way ANOVA and eta-squared per
/// subject, and saves two chart images.
///
/// Examples:
///   edustat
///   edustat --input Urban.xlsx --sheet Children_Parents_matched_June24
///   edustat --output-dir charts --verbose
///   edustat --no-charts --quiet
///   edustat --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Workbook to analyze
    ///
    /// Defaults to the config file value, or Urban.xlsx.
    #[arg(short, long, value_name = "FILE", env = "EDUSTAT_INPUT")]
    pub input: Option<PathBuf>,

    /// Worksheet holding the survey rows
    #[arg(short, long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Directory to write chart images into
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .edustat.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip chart rendering, print the text report only
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .edustat.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref sheet) = self.sheet {
            if sheet.trim().is_empty() {
                return Err("Sheet name must not be empty".to_string());
            }
        }

        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        if let Some(ref dir) = self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Output path is not a directory: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
