//! JSON report
//!
//! The summary figures plus enough run metadata (seed, target, wall time) to
//! reproduce and compare runs.

use crate::harness::RunOutcome;
use crate::stats::Summary;
use crate::util::time::{format_duration, format_rate, format_throughput};
use crate::worker::WorkerReport;
use crate::Result;
use anyhow::Context;
use serde::Serialize;

/// One worker's entry in the JSON report
#[derive(Debug, Clone, Serialize)]
pub struct JsonWorker {
    pub id: usize,
    pub elapsed_ms: f64,
    pub reads: u64,
    pub writes: u64,
    pub errors: u64,
}

impl From<&WorkerReport> for JsonWorker {
    fn from(report: &WorkerReport) -> Self {
        Self {
            id: report.id,
            elapsed_ms: report.elapsed_ms(),
            reads: report.reads,
            writes: report.writes,
            errors: report.errors,
        }
    }
}

/// Top-level JSON document
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    #[serde(flatten)]
    pub summary: &'a Summary,
    pub wall_time: String,
    pub iops_human: String,
    pub throughput_human: String,
    pub seed: u64,
    pub target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<Vec<JsonWorker>>,
}

impl<'a> JsonReport<'a> {
    pub fn new(summary: &'a Summary, outcome: &'a RunOutcome, per_worker: bool) -> Self {
        let workers = per_worker.then(|| outcome.results.iter().map(JsonWorker::from).collect());
        Self {
            summary,
            wall_time: format_duration(outcome.total_wall),
            iops_human: format_rate(summary.iops),
            throughput_human: format_throughput(summary.throughput),
            seed: outcome.seed,
            target: &outcome.target,
            workers,
        }
    }
}

/// Render a pretty-printed JSON report
pub fn render_json(summary: &Summary, outcome: &RunOutcome, per_worker: bool) -> Result<String> {
    let report = JsonReport::new(summary, outcome, per_worker);
    serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")
}
