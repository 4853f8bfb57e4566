//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// probe-report - response-time statistics for HTTP load tests
///
/// Replays result logs (one `status,duration` pair per line, durations in
/// milliseconds) and prints overall and per-status response-time percentiles.
///
/// Examples:
///   probe-report results.csv
///   probe-report ./runs --extensions csv,log --concurrency 8
///   probe-report worker-*.log --delimiter ';' --strict
///   probe-report --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Result logs or directories containing them
    #[arg(value_name = "PATH", required_unless_present = "init_config")]
    pub inputs: Vec<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .probe-report.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// File extensions to pick up from directories (comma-separated)
    ///
    /// Example: --extensions csv,log
    #[arg(long, value_name = "EXTS", value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// File or directory names to skip (comma-separated)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Field separator used in result logs
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Number of result logs read in parallel
    #[arg(long, value_name = "NUM", env = "PROBE_REPORT_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Fail on the first malformed line instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Generate a default .probe-report.toml configuration file
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
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(missing) = self.inputs.iter().find(|path| !path.exists()) {
            return Err(format!("Input does not exist: {}", missing.display()));
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
