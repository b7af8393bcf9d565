//! Edustat - parental education vs. student grades
//!
//! A CLI tool that loads a survey workbook, groups students by their
//! parents' education level, and reports descriptive statistics,
//! one-way ANOVA and eta-squared per subject, plus two chart images.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (config, missing file/sheet/column, bad data, chart failure)

mod analysis;
mod cli;
mod config;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Edustat v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_analysis(&args) {
        error!("Analysis failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .edustat.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            config::DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", config::DEFAULT_CONFIG_FILE);
    println!("   Edit it to point at another workbook, sheet, or column layout.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so stdout carries only the report.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete pipeline: load, clean, analyze, chart, report.
fn run_analysis(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(args, Path::new("."))?;
    config.merge_with_args(args);

    // Step 1: Load and clean
    let table = loader::read_sheet(&config.input.path, &config.input.sheet)
        .with_context(|| format!("Failed to load {}", config.input.path.display()))?;
    let dataset = loader::clean(&table, &config.columns).context("Failed to clean survey data")?;
    info!(
        "Dataset ready: {} records, {} education groups",
        dataset.len(),
        dataset.group_labels().len()
    );

    // Step 2: Statistics
    let report = analysis::analyze(&dataset)?;

    // Step 3: Charts
    if config.output.charts {
        let written = report::render_charts(&config.output, &dataset, &report)
            .context("Failed to render charts")?;
        debug!("Charts written: {:?}", written);
    } else {
        info!("Chart rendering disabled");
    }

    // Step 4: Report
    print!("{}", report::render_report(&report));

    info!("Done in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

/// Load configuration from an explicit path, `dir`'s default file, or defaults.
///
/// A default file that exists but cannot be parsed is an error.
fn load_config(args: &Args, dir: &Path) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    let loaded = Config::load_default(dir)
        .with_context(|| format!("Failed to load {}", config::DEFAULT_CONFIG_FILE))?;
    match loaded {
        Some(config) => {
            info!("Loaded default config from {}", config::DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_malformed_default_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(config::DEFAULT_CONFIG_FILE), "[input\nsheet = 3").unwrap();
        let args = Args::try_parse_from(["edustat"]).unwrap();

        let err = load_config(&args, dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains(config::DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_missing_default_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::try_parse_from(["edustat"]).unwrap();

        let config = load_config(&args, dir.path()).unwrap();
        assert_eq!(config.input.sheet, Config::default().input.sheet);
    }

    #[test]
    fn test_default_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(config::DEFAULT_CONFIG_FILE),
            "[input]\nsheet = \"Rural\"\n",
        )
        .unwrap();
        let args = Args::try_parse_from(["edustat"]).unwrap();

        let config = load_config(&args, dir.path()).unwrap();
        assert_eq!(config.input.sheet, "Rural");
    }
}
