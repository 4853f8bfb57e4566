//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.probe-report.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name looked up in the current directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".probe-report.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Result log settings.
    #[serde(default)]
    pub input: InputConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of result logs read in parallel.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

/// Result log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// File extensions picked up when walking directories.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// File and directory names to skip.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    /// Field separator within a line.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Abort on malformed lines instead of skipping them.
    #[serde(default)]
    pub strict: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            excludes: default_excludes(),
            delimiter: default_delimiter(),
            strict: false,
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["csv", "log", "txt"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_excludes() -> Vec<String> {
    vec![".git", "target"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_delimiter() -> char {
    ','
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

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }
        if let Some(ref extensions) = args.extensions {
            self.input.extensions = extensions.clone();
        }
        if let Some(ref excludes) = args.exclude {
            self.input.excludes = excludes.clone();
        }
        if let Some(delimiter) = args.delimiter {
            self.input.delimiter = delimiter;
        }

        // Flags always override
        if args.strict {
            self.input.strict = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.concurrency, 4);
        assert_eq!(config.input.delimiter, ',');
        assert!(config.input.extensions.contains(&"csv".to_string()));
        assert!(!config.input.strict);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true
concurrency = 8

[input]
extensions = ["tsv"]
delimiter = "\t"
strict = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.general.concurrency, 8);
        assert_eq!(config.input.extensions, vec!["tsv"]);
        assert_eq!(config.input.delimiter, '\t');
        assert!(config.input.strict);
        assert_eq!(config.input.excludes, default_excludes());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        assert_eq!(config.general.concurrency, 4);
        assert_eq!(config.input.delimiter, ',');
    }

    #[test]
    fn test_merge_with_args() {
        let args = Args::parse_from([
            "probe-report",
            "--concurrency",
            "2",
            "--delimiter",
            ";",
            "--strict",
            "results.csv",
        ]);

        let mut config = Config::default();
        config.input.extensions = vec!["log".to_string()];
        config.merge_with_args(&args);

        assert_eq!(config.general.concurrency, 2);
        assert_eq!(config.input.delimiter, ';');
        assert!(config.input.strict);
        // Not given on the command line, so the file value stays
        assert_eq!(config.input.extensions, vec!["log"]);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[input]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.input.delimiter, ',');
    }
}
