//! Analysis modules.
//!
//! Statistics are computed from the aggregator's observations on demand.

pub mod aggregator;

pub use aggregator::*;
