//! Machine-readable comparison report, written as JSON on request.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

use super::Run;
use super::metrics::MetricRow;

/// Per-run statistics: sample counts and the wall-clock span of the status lines.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub label: String,
    pub source: PathBuf,
    pub throughput_samples: usize,
    pub latency_samples: usize,
    pub unrecognized_lines: usize,
    pub started_at: Option<NaiveDateTime>,
    pub finished_at: Option<NaiveDateTime>,
}

impl From<&Run> for RunSummary {
    fn from(run: &Run) -> Self {
        let span = run.log.wall_clock_span();
        Self {
            label: run.label.clone(),
            source: run.path.clone(),
            throughput_samples: run.log.throughput.len(),
            latency_samples: run.log.latencies.len(),
            unrecognized_lines: run.log.unrecognized_lines,
            started_at: span.map(|(first, _)| first),
            finished_at: span.map(|(_, last)| last),
        }
    }
}

/// Top-level JSON document comparing two runs.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    /// Bumped whenever the document layout changes.
    pub schema_version: u32,
    pub tool_version: String,
    pub left: RunSummary,
    pub right: RunSummary,
    pub metrics: Vec<MetricRow>,
}

impl ComparisonReport {
    /// Summarize both runs alongside their paired metric rows.
    pub fn new(left: &Run, right: &Run, metrics: Vec<MetricRow>) -> Self {
        Self {
            schema_version: 1,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            left: left.into(),
            right: right.into(),
            metrics,
        }
    }
}
