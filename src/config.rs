//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.edustat.toml` files. The defaults match the survey workbook
//! layout, so running without a config file analyses `Urban.xlsx`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".edustat.toml";

/// Header of the survey question used as the parental education category.
pub const PARENT_EDUCATION_QUESTION: &str = "What is your parents' education? Please indicate your mother's or stepmother's education: (Single choice)";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input workbook settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Column name mapping.
    #[serde(default)]
    pub columns: ColumnConfig,

    /// Chart output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the survey data lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Workbook path.
    #[serde(default = "default_input_path")]
    pub path: PathBuf,

    /// Worksheet name.
    #[serde(default = "default_sheet")]
    pub sheet: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            sheet: default_sheet(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("Urban.xlsx")
}

fn default_sheet() -> String {
    "Children_Parents_matched_June24".to_string()
}

/// Header names of the columns the analysis reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(default = "default_login")]
    pub login: String,

    #[serde(default = "default_sex")]
    pub sex: String,

    #[serde(default = "default_age")]
    pub age: String,

    #[serde(default = "default_grade")]
    pub grade: String,

    /// Column holding the parental education category.
    #[serde(default = "default_parent_education")]
    pub parent_education: String,

    /// Subject score columns, in report order.
    #[serde(default = "default_subjects")]
    pub subjects: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            login: default_login(),
            sex: default_sex(),
            age: default_age(),
            grade: default_grade(),
            parent_education: default_parent_education(),
            subjects: default_subjects(),
        }
    }
}

fn default_login() -> String {
    "Login".to_string()
}

fn default_sex() -> String {
    "sex".to_string()
}

fn default_age() -> String {
    "age".to_string()
}

fn default_grade() -> String {
    "grade".to_string()
}

fn default_parent_education() -> String {
    PARENT_EDUCATION_QUESTION.to_string()
}

fn default_subjects() -> Vec<String> {
    vec![
        "Mathematics or algebra",
        "Russian language",
        "Foreign language (primary)",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Chart output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the chart images are written to.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// File name of the grouped bar chart.
    #[serde(default = "default_bar_chart")]
    pub bar_chart: String,

    /// File name of the distribution chart.
    #[serde(default = "default_distribution_chart")]
    pub distribution_chart: String,

    /// Render charts at all.
    #[serde(default = "default_true")]
    pub charts: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            bar_chart: default_bar_chart(),
            distribution_chart: default_distribution_chart(),
            charts: true,
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_bar_chart() -> String {
    "education_analysis.png".to_string()
}

fn default_distribution_chart() -> String {
    "education_analysis_detailed.png".to_string()
}

fn default_true() -> bool {
    true
}

impl OutputConfig {
    /// Full path of the grouped bar chart.
    pub fn bar_chart_path(&self) -> PathBuf {
        self.directory.join(&self.bar_chart)
    }

    /// Full path of the distribution chart.
    pub fn distribution_chart_path(&self) -> PathBuf {
        self.directory.join(&self.distribution_chart)
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location in `dir`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default(dir: &Path) -> Result<Option<Self>> {
        let default_path = dir.join(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(&default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user actually passed override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.input.path = input.clone();
        }
        if let Some(ref sheet) = args.sheet {
            self.input.sheet = sheet.clone();
        }
        if let Some(ref dir) = args.output_dir {
            self.output.directory = dir.clone();
        }

        // Flags always override
        if args.no_charts {
            self.output.charts = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
