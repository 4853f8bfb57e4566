//! Response aggregation and statistics.
//!
//! [`ResultsAggregator`] collects one [`Observation`] per completed request
//! and computes summary statistics over everything recorded so far, both in
//! aggregate and per HTTP status code.

use crate::models::{Hundredths, Observation, PopulationStats, ResultsSummary, StatusStats};
use crate::report;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Thread-safe, append-only collection of request outcomes.
///
/// Share it between workers behind an `Arc`; every method takes `&self`.
#[derive(Debug, Default)]
pub struct ResultsAggregator {
    observations: Mutex<Vec<Observation>>,
}

impl ResultsAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the status code and duration of a completed request.
    pub fn record(&self, status_code: i32, duration: i64) {
        self.lock().push(Observation::new(status_code, duration));
    }

    /// Number of observations recorded so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies the current observations out from under the lock.
    pub fn snapshot(&self) -> Vec<Observation> {
        self.lock().clone()
    }

    /// Computes the structured summary of everything recorded so far.
    pub fn summarize(&self) -> ResultsSummary {
        summarize_observations(&self.snapshot())
    }

    /// Renders the text report for everything recorded so far.
    pub fn render(&self) -> String {
        report::generate_text_report(&self.summarize())
    }

    // A panic elsewhere cannot leave a Vec half-pushed, so a poisoned lock
    // still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<Observation>> {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for ResultsAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Summarize a fixed set of observations.
pub fn summarize_observations(observations: &[Observation]) -> ResultsSummary {
    let total = observations.len();
    let durations: Vec<i64> = observations.iter().map(|o| o.duration).collect();
    let overall = population_stats(&durations);

    let by_status: Vec<StatusStats> = group_by_status(observations)
        .into_iter()
        .map(|(status, durations)| {
            assert!(
                !durations.is_empty(),
                "status group {} has no observations",
                status
            );
            trace!("Status {}: {} responses", status, durations.len());

            StatusStats {
                status,
                proportion: proportion(durations.len(), total),
                stats: population_stats(&durations),
            }
        })
        .collect();

    debug!(
        "Summarized {} responses across {} status codes",
        total,
        by_status.len()
    );

    ResultsSummary { overall, by_status }
}

/// Group durations by status code, keys in ascending order.
pub fn group_by_status(observations: &[Observation]) -> BTreeMap<i32, Vec<i64>> {
    let mut grouped: BTreeMap<i32, Vec<i64>> = BTreeMap::new();

    for observation in observations {
        grouped
            .entry(observation.status)
            .or_default()
            .push(observation.duration);
    }

    grouped
}

/// Compute count, mean and the reported percentiles of a population.
pub fn population_stats(durations: &[i64]) -> PopulationStats {
    let mean_duration = mean(durations);

    let mut sorted = durations.to_vec();
    sorted.sort_unstable();

    PopulationStats {
        count: sorted.len(),
        mean: mean_duration,
        p50: nearest_rank(&sorted, 50),
        p75: nearest_rank(&sorted, 75),
        p90: nearest_rank(&sorted, 90),
        p95: nearest_rank(&sorted, 95),
        p99: nearest_rank(&sorted, 99),
        max: nearest_rank(&sorted, 100),
    }
}

/// Arithmetic mean, rounded half-to-even to two decimals. Zero when empty.
///
/// Summed as `f64` in the given order; the double result is what gets rounded.
pub fn mean(values: &[i64]) -> Hundredths {
    if values.is_empty() {
        return Hundredths::ZERO;
    }

    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    Hundredths::from_f64(sum / values.len() as f64)
}

/// Share of `count` in `total` as a percentage, rounded like [`mean`].
pub fn proportion(count: usize, total: usize) -> Hundredths {
    if total == 0 {
        return Hundredths::ZERO;
    }

    Hundredths::from_f64(count as f64 / total as f64 * 100.0)
}

/// Nearest-rank percentile of an unsorted population.
///
/// Returns the smallest value whose rank covers at least `p` percent of the
/// population, or 0 when `values` is empty.
pub fn percentile(values: &[i64], p: u32) -> i64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    nearest_rank(&sorted, p)
}

/// Nearest-rank selection on an already sorted slice.
fn nearest_rank(sorted: &[i64], p: u32) -> i64 {
    if sorted.is_empty() {
        return 0;
    }

    // ceil(p / 100 * n) in integer arithmetic
    let n = sorted.len() as u64;
    let rank = (u64::from(p) * n + 99) / 100;

    // Out-of-range p clamps to the first or last element.
    let rank = (rank as usize).clamp(1, sorted.len());
    sorted[rank - 1]
}
