//! probe-report - response-time statistics for HTTP load tests
//!
//! Replays captured result logs into a results aggregator and prints the
//! response-time report to stdout.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, unreadable input, malformed line in strict mode)

use anyhow::{Context, Result};
use probe_report::cli::Args;
use probe_report::config::{Config, DEFAULT_CONFIG_FILE};
use probe_report::ingest::{self, IngestConfig};
use probe_report::ResultsAggregator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
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

    // Config may enable verbose logging, so load it before the subscriber
    let (mut config, config_path) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(log_level(&args, &config));

    info!("probe-report v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_path {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    if let Err(e) = run_report(&args, &config).await {
        error!("Report failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .probe-report.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Quiet wins; otherwise verbose from either the flag or the config file.
fn log_level(args: &Args, config: &Config) -> tracing::Level {
    if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Read every input into one aggregator and print the report.
async fn run_report(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();
    let ingest_config = IngestConfig::from(config);

    let inputs = ingest::discover_inputs(&args.inputs, &ingest_config)
        .context("Failed to collect result logs")?;

    if inputs.is_empty() {
        warn!("No result logs found; the report will be empty");
    }
    info!(
        "Reading {} result logs ({} at a time)",
        inputs.len(),
        ingest_config.concurrency.max(1)
    );

    let results = Arc::new(ResultsAggregator::new());
    let summary = ingest::ingest_all(inputs, Arc::clone(&results), &ingest_config).await?;

    info!(
        "Recorded {} responses from {} files ({} lines skipped) in {:.2}s",
        summary.recorded,
        summary.files,
        summary.skipped,
        start_time.elapsed().as_secs_f64()
    );

    print!("{}", results.render());
    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Returns the path the configuration came from, if any.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // Try default location
    match Config::load_default()? {
        Some(config) => Ok((config, Some(PathBuf::from(DEFAULT_CONFIG_FILE)))),
        None => Ok((Config::default(), None)),
    }
}
