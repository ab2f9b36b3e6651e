//! Comparison of two benchmark runs.
//!
//! Parses both logs, writes the text summary of their metrics and renders
//! one throughput chart plus one latency chart per operation kind into an
//! output directory. Existing files of the same names are replaced.

pub mod charts;
pub mod metrics;
pub mod render;
pub mod summary;

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::analyzer::{LineClassifier, LogParseError, OperationKind, ParsedLog, parse_log_file};
use crate::config::CompareConfig;

use charts::{latency_charts, throughput_chart};
use metrics::{compare_metrics, write_metrics_report};
use summary::ComparisonReport;

/// File name of the text summary.
pub const METRICS_FILE: &str = "global_metrics.txt";

/// One parsed benchmark log and the label it is shown under.
#[derive(Debug, Clone)]
pub struct Run {
    pub label: String,
    pub path: PathBuf,
    pub log: ParsedLog,
}

impl Run {
    /// Parse the log at `path`, labeling it after the file name.
    pub fn load(path: &Path, classifier: &LineClassifier) -> Result<Self, LogParseError> {
        Ok(Self {
            label: run_label(path),
            path: path.to_path_buf(),
            log: parse_log_file(path, classifier)?,
        })
    }
}

/// Label for a run: the file name without directory, cut at the first `.`.
pub fn run_label(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    match file_name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file_name.clone(),
    }
}

/// Settings for `compare_runs`.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub output_dir: PathBuf,
    pub chart_size: (u32, u32),
    pub excluded_operations: Vec<OperationKind>,
    pub extra_operations: Vec<String>,
    pub render_charts: bool,
    /// Where to write the JSON comparison report, if anywhere.
    pub json_report: Option<PathBuf>,
}

impl From<&CompareConfig> for CompareOptions {
    fn from(config: &CompareConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            chart_size: (config.chart_width, config.chart_height),
            excluded_operations: config.excluded_operations.iter().map(|name| OperationKind::from_name(name.trim())).collect(),
            extra_operations: config.extra_operations.clone(),
            render_charts: true,
            json_report: None,
        }
    }
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self::from(&CompareConfig::default())
    }
}

/// Artifacts produced by a comparison.
#[derive(Debug, Default)]
pub struct ComparisonOutcome {
    /// Every file written, in writing order.
    pub written: Vec<PathBuf>,
}

/// Compare two benchmark logs.
///
/// # Parameters
///
/// * `left` - Log of the first run
/// * `right` - Log of the second run
/// * `options` - Output location and chart settings
///
/// # Returns
///
/// The list of written artifacts, or the first parse, I/O or rendering error.
pub fn compare_runs(left: &Path, right: &Path, options: &CompareOptions) -> Result<ComparisonOutcome> {
    let classifier = LineClassifier::with_extra_operations(options.extra_operations.as_slice());
    log::debug!(
        "Recognized operations: {}",
        classifier.operations().map(|op| op.as_str()).collect::<Vec<_>>().join(", ")
    );
    let left = Run::load(left, &classifier)?;
    let right = Run::load(right, &classifier)?;

    fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("Failed to create output directory {}", options.output_dir.display()))?;

    let mut outcome = ComparisonOutcome::default();

    let rows = compare_metrics(&left.log.metrics, &right.log.metrics);
    let metrics_path = options.output_dir.join(METRICS_FILE);
    write_metrics_file(&metrics_path, &rows)?;
    log::info!("Wrote {} ({} metrics)", metrics_path.display(), rows.len());
    outcome.written.push(metrics_path);

    let runs = [left, right];
    if options.render_charts {
        let charts = std::iter::once(throughput_chart(&runs)).chain(latency_charts(&runs, &options.excluded_operations));
        for chart in charts {
            let path = options.output_dir.join(&chart.file_name);
            render::save_chart(&chart, options.chart_size, &path)?;
            outcome.written.push(path);
        }
    } else {
        log::debug!("Chart rendering disabled");
    }

    if let Some(json_path) = &options.json_report {
        let [left, right] = &runs;
        let report = ComparisonReport::new(left, right, rows);
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize comparison report")?;
        fs::write(json_path, json).with_context(|| format!("Failed to write {}", json_path.display()))?;
        log::info!("Wrote {}", json_path.display());
        outcome.written.push(json_path.clone());
    }

    Ok(outcome)
}

fn write_metrics_file(path: &Path, rows: &[metrics::MetricRow]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_metrics_report(rows, &mut out).with_context(|| format!("Failed to write {}", path.display()))?;
    out.flush().with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
