//! Report rendering

pub mod json;
pub mod text;

use crate::config::{OutputConfig, OutputFormat};
use crate::harness::RunOutcome;
use crate::stats::Summary;
use crate::Result;

/// Render the report for a finished run in the configured format
pub fn render(config: &OutputConfig, summary: &Summary, outcome: &RunOutcome) -> Result<String> {
    let per_worker = config.per_worker.then_some(&outcome.results);
    match config.format {
        OutputFormat::Text => Ok(text::render_text(summary, per_worker)),
        OutputFormat::Json => json::render_json(summary, outcome, config.per_worker).map(|s| s + "\n"),
    }
}
