//! Result log discovery and ingestion.
//!
//! Input paths may be files or directories. Directories are walked for files
//! with a configured extension, and every discovered log is replayed into a
//! shared [`ResultsAggregator`] by a bounded set of tokio tasks.

pub mod parser;

pub use parser::{ingest_str, parse_line, FileStats, IngestError, LineError};

use crate::analysis::ResultsAggregator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Settings for finding and reading result logs.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// File extensions picked up when walking directories (e.g., ["csv", "log"])
    pub extensions: Vec<String>,
    /// File or directory names skipped when walking
    pub excludes: Vec<String>,
    /// Field separator within a line
    pub delimiter: char,
    /// Fail on the first malformed line instead of skipping it
    pub strict: bool,
    /// Number of files read in parallel
    pub concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["csv", "log", "txt"]
                .into_iter()
                .map(String::from)
                .collect(),
            excludes: vec![".git", "target"]
                .into_iter()
                .map(String::from)
                .collect(),
            delimiter: ',',
            strict: false,
            concurrency: 4,
        }
    }
}

impl From<&crate::config::Config> for IngestConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            extensions: config.input.extensions.clone(),
            excludes: config.input.excludes.clone(),
            delimiter: config.input.delimiter,
            strict: config.input.strict,
            concurrency: config.general.concurrency,
        }
    }
}

/// Totals across every ingested file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Number of files read.
    pub files: usize,
    /// Observations recorded.
    pub recorded: usize,
    /// Malformed lines skipped.
    pub skipped: usize,
}

impl IngestSummary {
    fn add(&mut self, stats: FileStats) {
        self.files += 1;
        self.recorded += stats.recorded;
        self.skipped += stats.skipped;
    }
}

/// Expand the given inputs into the list of result logs to read.
///
/// Files named explicitly are always kept. Directory contents are filtered
/// by extension and sorted.
pub fn discover_inputs(
    inputs: &[PathBuf],
    config: &IngestConfig,
) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();

    for input in inputs {
        let metadata = std::fs::metadata(input).map_err(|source| IngestError::Io {
            path: input.clone(),
            source,
        })?;

        if metadata.is_dir() {
            let mut found = walk_dir(input, config);
            found.sort();
            debug!("Found {} result logs in {}", found.len(), input.display());
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    Ok(files)
}

fn walk_dir(dir: &Path, config: &IngestConfig) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(config, entry.file_name()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Cannot read directory entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_extension(config, entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Hidden entries and configured names are skipped.
fn is_excluded(config: &IngestConfig, name: &std::ffi::OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') || config.excludes.iter().any(|pattern| name == pattern.as_str())
}

fn has_extension(config: &IngestConfig, path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    config.extensions.iter().any(|allowed| allowed == ext)
}

/// Read one result log into the aggregator.
pub async fn ingest_file(
    path: PathBuf,
    results: Arc<ResultsAggregator>,
    config: Arc<IngestConfig>,
) -> Result<FileStats, IngestError> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| IngestError::Io {
            path: path.clone(),
            source,
        })?;

    let stats = ingest_str(&content, &path, &results, config.delimiter, config.strict)?;

    info!(
        "Read {}: {} responses, {} skipped",
        path.display(),
        stats.recorded,
        stats.skipped
    );

    Ok(stats)
}

/// Read every result log into the aggregator, `concurrency` files at a time.
///
/// Stops at the first file that fails: the remaining tasks are aborted and
/// drained, so nothing is recorded once this returns.
pub async fn ingest_all(
    paths: Vec<PathBuf>,
    results: Arc<ResultsAggregator>,
    config: &IngestConfig,
) -> Result<IngestSummary, IngestError> {
    let concurrency = config.concurrency.max(1);
    let config = Arc::new(config.clone());

    let mut pending = paths.into_iter();
    let mut tasks = JoinSet::new();
    let mut summary = IngestSummary::default();

    loop {
        while tasks.len() < concurrency {
            let Some(path) = pending.next() else {
                break;
            };
            tasks.spawn(ingest_file(path, Arc::clone(&results), Arc::clone(&config)));
        }

        let Some(joined) = tasks.join_next().await else {
            break;
        };

        match joined.map_err(|e| IngestError::Task(e.to_string())) {
            Ok(Ok(stats)) => summary.add(stats),
            Ok(Err(e)) | Err(e) => {
                debug!("Aborting {} in-flight result logs", tasks.len());
                tasks.abort_all();
                while tasks.join_next().await.is_some() {}
                return Err(e);
            }
        }
    }

    Ok(summary)
}
