//! Analysis modules.
//!
//! Tagging of extracted rows and aggregation of a group's snapshots.

pub mod aggregator;

pub use aggregator::*;
