//! Plain text report
//!
//! A commented header line followed by one whitespace-separated row, so the
//! output can be appended to a file and fed to gnuplot or awk unchanged.

use crate::harness::ResultSet;
use crate::stats::Summary;
use std::fmt::Write;

pub const HEADER: &str = "# THREADS REQUESTS IOPS AVG_LATENCY";

/// Render the summary, optionally followed by per-worker elapsed times
pub fn render_text(summary: &Summary, per_worker: Option<&ResultSet>) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "{:8} {:8} {:8.6} {:8.6}",
        summary.thread_count, summary.requests_per_thread, summary.iops, summary.average_latency_ms
    );

    if let Some(results) = per_worker {
        out.push_str("# WORKER ELAPSED_MS READS WRITES ERRORS\n");
        for report in results.iter() {
            let _ = writeln!(
                out,
                "{:8} {:8.6} {:8} {:8} {:8}",
                report.id,
                report.elapsed_ms(),
                report.reads,
                report.writes,
                report.errors
            );
        }
    }
    out
}
