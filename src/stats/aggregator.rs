//! Result aggregation
//!
//! Turns a [`RunOutcome`](crate::harness::RunOutcome) into a [`Summary`].
//!
//! IOPS assumes every worker issued exactly `requests_per_thread` requests,
//! failed ones included, and divides by the harness wall time. Average
//! latency is the mean worker time divided by the requests each worker
//! issued, so it includes the loop overhead around each request.
//!
//! # Example
//!
//! ```
//! use pario::stats::{average_latency_ms, compute_iops};
//!
//! assert_eq!(compute_iops(100, 4, 1_000_000.0), 400.0);
//! assert_eq!(average_latency_ms(&[100.0, 200.0, 150.0, 50.0], 10), 12.5);
//! ```

use crate::config::BenchmarkConfig;
use crate::harness::{ResultSet, RunOutcome};
use crate::util::time::{as_micros_f64, as_millis_f64, calculate_throughput};
use crate::Result;
use serde::Serialize;

/// Headline figures of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub thread_count: usize,
    pub requests_per_thread: u64,
    pub iops: f64,
    pub average_latency_ms: f64,
    pub total_wall_ms: f64,
    /// Bytes moved by successful requests per second of wall time
    pub throughput: f64,
    pub errors: u64,
}

/// Aggregate IOPS over the whole run
///
/// Returns 0 when no wall time was measured.
pub fn compute_iops(requests_per_thread: u64, thread_count: usize, total_wall_us: f64) -> f64 {
    if total_wall_us <= 0.0 {
        return 0.0;
    }
    1_000_000.0 * requests_per_thread as f64 * thread_count as f64 / total_wall_us
}

/// Mean per-request latency in milliseconds from per-worker elapsed times
///
/// Returns 0 when there are no workers or no requests.
pub fn average_latency_ms(elapsed_ms: &[f64], requests_per_thread: u64) -> f64 {
    if elapsed_ms.is_empty() || requests_per_thread == 0 {
        return 0.0;
    }
    let sum: f64 = elapsed_ms.iter().sum();
    sum / elapsed_ms.len() as f64 / requests_per_thread as f64
}

/// Reduces worker results for one workload
#[derive(Debug, Clone)]
pub struct ResultAggregator<'a> {
    workload: &'a BenchmarkConfig,
}

impl<'a> ResultAggregator<'a> {
    pub fn new(workload: &'a BenchmarkConfig) -> Self {
        Self { workload }
    }

    /// Summarize a finished run
    ///
    /// # Errors
    ///
    /// Fails if the result set does not hold one report per configured worker.
    pub fn aggregate(&self, outcome: &RunOutcome) -> Result<Summary> {
        self.check_len(&outcome.results)?;

        let wall_us = as_micros_f64(outcome.total_wall);
        Ok(Summary {
            thread_count: self.workload.thread_count,
            requests_per_thread: self.workload.requests_per_thread,
            iops: compute_iops(
                self.workload.requests_per_thread,
                self.workload.thread_count,
                wall_us,
            ),
            average_latency_ms: average_latency_ms(
                &outcome.results.elapsed_ms(),
                self.workload.requests_per_thread,
            ),
            total_wall_ms: as_millis_f64(outcome.total_wall),
            throughput: calculate_throughput(self.completed_bytes(&outcome.results), outcome.total_wall),
            errors: outcome.results.total_errors(),
        })
    }

    fn completed_bytes(&self, results: &ResultSet) -> u64 {
        let completed: u64 = results.iter().map(|r| r.reads + r.writes).sum();
        completed * self.workload.io_size as u64
    }

    fn check_len(&self, results: &ResultSet) -> Result<()> {
        if results.len() != self.workload.thread_count {
            anyhow::bail!(
                "result set holds {} reports, expected one per worker ({})",
                results.len(),
                self.workload.thread_count
            );
        }
        Ok(())
    }
}
