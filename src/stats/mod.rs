//! Run statistics
//!
//! Reduces the per-worker results of a run to the two headline figures the
//! report prints: aggregate IOPS and average per-request latency.

pub mod aggregator;

pub use aggregator::{average_latency_ms, compute_iops, ResultAggregator, Summary};
