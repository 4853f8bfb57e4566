//! Result log parsing.
//!
//! A result log holds one `status<delim>duration` pair per line. Blank lines,
//! `#` comments and a leading header row are ignored.

use crate::analysis::ResultsAggregator;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single line could not be read as an observation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("expected '<status>{0}<duration>'")]
    MissingField(char),

    #[error("invalid status code '{0}'")]
    InvalidStatus(String),

    #[error("invalid duration '{0}'")]
    InvalidDuration(String),
}

/// Errors raised while reading result logs.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: LineError,
    },

    #[error("Ingestion task failed: {0}")]
    Task(String),
}

/// Line counts for one result log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    /// Observations recorded.
    pub recorded: usize,
    /// Malformed lines skipped.
    pub skipped: usize,
}

/// Parse one trimmed, non-empty line into `(status, duration)`.
///
/// Fields beyond the second are ignored.
pub fn parse_line(line: &str, delimiter: char) -> Result<(i32, i64), LineError> {
    let mut fields = line.split(delimiter).map(str::trim);

    let status = fields.next().unwrap_or_default();
    let duration = fields.next().ok_or(LineError::MissingField(delimiter))?;

    let status = status
        .parse::<i32>()
        .map_err(|_| LineError::InvalidStatus(status.to_string()))?;
    let duration = duration
        .parse::<i64>()
        .map_err(|_| LineError::InvalidDuration(duration.to_string()))?;

    Ok((status, duration))
}

/// A header row has no numeric field at all.
fn is_header(line: &str, delimiter: char) -> bool {
    line.split(delimiter)
        .all(|field| field.trim().parse::<i64>().is_err())
}

/// Parse a whole result log and record its observations.
///
/// In strict mode the first malformed line fails the file and nothing from
/// it is recorded.
pub fn ingest_str(
    content: &str,
    path: &Path,
    results: &ResultsAggregator,
    delimiter: char,
    strict: bool,
) -> Result<FileStats, IngestError> {
    let mut observations = Vec::new();
    let mut skipped = 0;
    let mut first_row = true;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let is_first = std::mem::replace(&mut first_row, false);

        match parse_line(line, delimiter) {
            Ok(observation) => observations.push(observation),
            Err(_) if is_first && is_header(line, delimiter) => {
                debug!("{}: skipping header '{}'", path.display(), line);
            }
            Err(source) if strict => {
                return Err(IngestError::Parse {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    source,
                });
            }
            Err(source) => {
                warn!("{}:{}: {}, skipping line", path.display(), idx + 1, source);
                skipped += 1;
            }
        }
    }

    for &(status, duration) in &observations {
        results.record(status, duration);
    }

    Ok(FileStats {
        recorded: observations.len(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingest(content: &str, strict: bool) -> (ResultsAggregator, Result<FileStats, IngestError>) {
        let results = ResultsAggregator::new();
        let stats = ingest_str(content, Path::new("run.csv"), &results, ',', strict);
        (results, stats)
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("200,153", ','), Ok((200, 153)));
        assert_eq!(parse_line(" 404 , 12 ", ','), Ok((404, 12)));
        assert_eq!(parse_line("500;7;extra", ';'), Ok((500, 7)));
        assert_eq!(parse_line("200,-3", ','), Ok((200, -3)));
    }

    #[test]
    fn test_parse_line_errors() {
        assert_eq!(parse_line("200", ','), Err(LineError::MissingField(',')));
        assert_eq!(
            parse_line("OK,10", ','),
            Err(LineError::InvalidStatus("OK".to_string()))
        );
        assert_eq!(
            parse_line("200,1.5", ','),
            Err(LineError::InvalidDuration("1.5".to_string()))
        );
    }

    #[test]
    fn test_ingest_skips_header_comments_and_blanks() {
        let content = "status,duration\n# warmup excluded\n\n200,100\n200,200\n500,50\n";
        let (results, stats) = ingest(content, false);

        assert_eq!(
            stats.unwrap(),
            FileStats {
                recorded: 3,
                skipped: 0
            }
        );
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_header_only_skipped_on_first_row() {
        let content = "200,100\nstatus,duration\n";
        let (results, stats) = ingest(content, false);

        assert_eq!(stats.unwrap().skipped, 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_malformed_line_skipped_when_lenient() {
        let content = "200,100\n200,abc\n404,5\n";
        let (results, stats) = ingest(content, false);

        assert_eq!(
            stats.unwrap(),
            FileStats {
                recorded: 2,
                skipped: 1
            }
        );
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_malformed_line_fails_when_strict() {
        let content = "200,100\n200,abc\n404,5\n";
        let (results, stats) = ingest(content, true);

        match stats {
            Err(IngestError::Parse { line, source, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(source, LineError::InvalidDuration("abc".to_string()));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(results.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = IngestError::Parse {
            path: PathBuf::from("logs/run.csv"),
            line: 7,
            source: LineError::InvalidStatus("x".to_string()),
        };
        assert_eq!(err.to_string(), "logs/run.csv:7: invalid status code 'x'");

        let err = IngestError::Task("cancelled".to_string());
        assert_eq!(err.to_string(), "Ingestion task failed: cancelled");
    }
}
