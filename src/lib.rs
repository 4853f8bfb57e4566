//! probe-report - response-time statistics for HTTP load tests
//!
//! A load generator records one `(status, duration)` pair per completed
//! request into a shared [`ResultsAggregator`]; at the end of the run the
//! aggregator renders a text report with the mean and nearest-rank
//! percentiles, overall and per HTTP status code.
//!
//! ```
//! use probe_report::ResultsAggregator;
//!
//! let results = ResultsAggregator::new();
//! results.record(200, 120);
//! results.record(503, 15);
//!
//! let report = results.render();
//! assert!(report.contains("Number of responses:    2"));
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod models;
pub mod report;

pub use analysis::ResultsAggregator;
pub use models::{Hundredths, Observation, PopulationStats, ResultsSummary, StatusStats};
