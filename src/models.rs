//! Data models for response-time reporting.
//!
//! This module contains the recorded observation type and the structured
//! summary that the text report is rendered from.

use std::cmp::Ordering;
use std::fmt;

/// A single completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Observation {
    /// HTTP status code of the response (not validated).
    pub status: i32,
    /// Request duration, in milliseconds.
    pub duration: i64,
}

impl Observation {
    /// Creates a new observation.
    pub fn new(status: i32, duration: i64) -> Self {
        Self { status, duration }
    }
}

/// A fixed-point number with exactly two decimal places.
///
/// Stored as an integer count of hundredths so that rounding happens exactly
/// once, when the value is built from a computed `f64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hundredths(i64);

impl Hundredths {
    /// Zero, as reported for empty populations.
    pub const ZERO: Hundredths = Hundredths(0);

    /// Wraps a raw count of hundredths.
    pub fn from_raw(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Returns the raw count of hundredths.
    pub fn raw(self) -> i64 {
        self.0
    }

    /// Rounds the exact binary value of `value` to two decimal places, ties
    /// to even.
    ///
    /// The double is expanded exactly (mantissa times a power of two) before
    /// rounding, so `0.005_f64`, which lies slightly above 0.005, becomes 0.01.
    /// Non-finite values yield zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }

        let bits = value.to_bits();
        let negative = bits >> 63 == 1;
        let exponent_bits = ((bits >> 52) & 0x7ff) as i32;
        let fraction = bits & ((1 << 52) - 1);

        let (mantissa, exponent) = if exponent_bits == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1 << 52), exponent_bits - 1075)
        };

        // |value| * 100 == scaled * 2^exponent, exactly
        let scaled = u128::from(mantissa) * 100;

        let magnitude = if exponent >= 0 {
            if exponent >= 64 {
                u128::MAX
            } else {
                scaled << exponent
            }
        } else {
            let shift = exponent.unsigned_abs();
            if shift >= 125 {
                0
            } else {
                let quotient = scaled >> shift;
                let remainder = scaled & ((1u128 << shift) - 1);
                let half = 1u128 << (shift - 1);

                match remainder.cmp(&half) {
                    Ordering::Less => quotient,
                    Ordering::Greater => quotient + 1,
                    Ordering::Equal if quotient % 2 == 0 => quotient,
                    Ordering::Equal => quotient + 1,
                }
            }
        };

        let magnitude = i64::try_from(magnitude).unwrap_or(i64::MAX);
        Self(if negative { -magnitude } else { magnitude })
    }

    /// Converts to a floating point value (for tolerance checks).
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Hundredths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Statistics for one population of durations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationStats {
    /// Number of observations.
    pub count: usize,
    /// Mean duration.
    pub mean: Hundredths,
    /// Median (50th percentile).
    pub p50: i64,
    /// 75th percentile.
    pub p75: i64,
    /// 90th percentile.
    pub p90: i64,
    /// 95th percentile.
    pub p95: i64,
    /// 99th percentile.
    pub p99: i64,
    /// 100th percentile.
    pub max: i64,
}

/// Statistics for all observations sharing one status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusStats {
    /// The HTTP status code.
    pub status: i32,
    /// Share of all observations, as a percentage.
    pub proportion: Hundredths,
    /// Statistics restricted to this status.
    pub stats: PopulationStats,
}

/// The structured results a report is rendered from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsSummary {
    /// Statistics over every observation.
    pub overall: PopulationStats,
    /// Per-status statistics, sorted by ascending status code.
    pub by_status: Vec<StatusStats>,
}

impl ResultsSummary {
    /// Looks up the statistics for a single status code.
    pub fn status(&self, status: i32) -> Option<&StatusStats> {
        self.by_status
            .binary_search_by_key(&status, |s| s.status)
            .ok()
            .map(|idx| &self.by_status[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hundredths_display() {
        assert_eq!(Hundredths::from_raw(16250).to_string(), "162.50");
        assert_eq!(Hundredths::from_raw(5).to_string(), "0.05");
        assert_eq!(Hundredths::ZERO.to_string(), "0.00");
        assert_eq!(Hundredths::from_raw(-150).to_string(), "-1.50");
        assert_eq!(Hundredths::from_raw(-7).to_string(), "-0.07");
    }

    #[test]
    fn test_from_f64_exact() {
        assert_eq!(Hundredths::from_f64(650.0 / 4.0).raw(), 16250);
        assert_eq!(Hundredths::from_f64(0.75 * 100.0).raw(), 7500);
        assert_eq!(Hundredths::from_f64(1.0 / 3.0).raw(), 33);
        assert_eq!(Hundredths::from_f64(2.0 / 3.0 * 100.0).raw(), 6667);
        assert_eq!(Hundredths::from_f64(0.0).raw(), 0);
        assert_eq!(Hundredths::from_f64(12345.678).raw(), 1234568);
    }

    #[test]
    fn test_from_f64_exact_ties_to_even() {
        // 0.125 and 0.375 are exact in binary
        assert_eq!(Hundredths::from_f64(0.125).raw(), 12);
        assert_eq!(Hundredths::from_f64(0.375).raw(), 38);
        assert_eq!(Hundredths::from_f64(2.5 / 100.0 * 100.0).raw(), 250);
    }

    #[test]
    fn test_from_f64_rounds_binary_value() {
        // The double nearest 0.005 is slightly above it, the one nearest
        // 0.015 slightly below.
        assert_eq!(Hundredths::from_f64(1.0 / 200.0).raw(), 1);
        assert_eq!(Hundredths::from_f64(3.0 / 200.0).raw(), 1);
        assert_eq!(Hundredths::from_f64(1.0 / 20000.0 * 100.0).raw(), 1);
    }

    #[test]
    fn test_from_f64_negative() {
        assert_eq!(Hundredths::from_f64(-0.125).raw(), -12);
        assert_eq!(Hundredths::from_f64(-1.0 / 3.0).raw(), -33);
        assert_eq!(Hundredths::from_f64(-2.5).raw(), -250);
    }

    #[test]
    fn test_from_f64_non_finite() {
        assert_eq!(Hundredths::from_f64(f64::NAN), Hundredths::ZERO);
        assert_eq!(Hundredths::from_f64(f64::INFINITY), Hundredths::ZERO);
    }

    #[test]
    fn test_summary_status_lookup() {
        let summary = ResultsSummary {
            overall: PopulationStats::default(),
            by_status: vec![
                StatusStats {
                    status: 200,
                    proportion: Hundredths::from_raw(5000),
                    stats: PopulationStats::default(),
                },
                StatusStats {
                    status: 404,
                    proportion: Hundredths::from_raw(5000),
                    stats: PopulationStats::default(),
                },
            ],
        };

        assert_eq!(summary.status(404).map(|s| s.status), Some(404));
        assert!(summary.status(500).is_none());
    }
}
