//! Chart planning: which series go on which chart.
//!
//! Planning is kept apart from drawing so the series selection can be
//! checked without producing images.

use std::collections::{BTreeMap, BTreeSet};

use super::Run;
use crate::analyzer::OperationKind;

/// File name of the throughput comparison chart.
pub const THROUGHPUT_CHART_FILE: &str = "throughput_comparison.png";

/// One labeled line on a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    /// Points sorted by x, one point per distinct x.
    pub points: Vec<(f64, f64)>,
}

impl Series {
    /// Build a series from raw samples.
    ///
    /// Samples are sorted by x and samples sharing the same x are averaged.
    /// Non-finite values (`inf`, `NaN`) have no place on an axis and are dropped.
    pub fn from_samples(label: impl Into<String>, samples: impl IntoIterator<Item = (u64, f64)>) -> Self {
        let label = label.into();
        let mut buckets: BTreeMap<u64, (f64, u32)> = BTreeMap::new();
        let mut dropped = 0usize;
        for (x, y) in samples {
            if !y.is_finite() {
                dropped += 1;
                continue;
            }
            let bucket = buckets.entry(x).or_insert((0.0, 0));
            bucket.0 += y;
            bucket.1 += 1;
        }

        let points = buckets
            .into_iter()
            .map(|(x, (sum, count))| (x as f64, sum / f64::from(count)))
            .collect();

        if dropped > 0 {
            log::warn!("Dropped {} non-finite samples from series {}", dropped, label);
        }

        Self { label, points }
    }
}

/// A planned line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// Image file name inside the output directory.
    pub file_name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

/// Plan the throughput-over-time chart: one series per run.
pub fn throughput_chart(runs: &[Run]) -> Chart {
    let series = runs
        .iter()
        .map(|run| {
            Series::from_samples(
                run.label.clone(),
                run.log.throughput.iter().map(|s| (s.elapsed_secs, s.throughput)),
            )
        })
        .collect();

    Chart {
        file_name: THROUGHPUT_CHART_FILE.to_string(),
        title: "Throughput Time Series Comparison".to_string(),
        x_label: "Time (s)".to_string(),
        y_label: "Throughput (ops/sec)".to_string(),
        series,
    }
}

/// Plan one latency chart per operation kind seen in any run.
///
/// Kinds in `excluded` get no chart. A run without samples of a kind
/// contributes no series to that kind's chart. Charts come out sorted by
/// operation kind.
pub fn latency_charts(runs: &[Run], excluded: &[OperationKind]) -> Vec<Chart> {
    let operations: BTreeSet<&OperationKind> = runs
        .iter()
        .flat_map(|run| run.log.latencies.iter().map(|s| &s.operation))
        .filter(|op| !excluded.contains(*op))
        .collect();

    operations
        .into_iter()
        .map(|operation| {
            let series = runs
                .iter()
                .filter_map(|run| {
                    let mut samples = run.log.latencies_for(operation).peekable();
                    samples.peek()?;
                    Some(Series::from_samples(
                        format!("{} {}", operation, run.label),
                        samples.map(|s| (s.timestamp, s.latency)),
                    ))
                })
                .collect();

            Chart {
                file_name: latency_chart_file(operation),
                title: format!("Time Series Comparison for {} Operations", operation),
                x_label: "Time (ms)".to_string(),
                y_label: "Latency (us)".to_string(),
                series,
            }
        })
        .collect()
}

/// File name of the latency chart for an operation kind.
pub fn latency_chart_file(operation: &OperationKind) -> String {
    format!("{}_comparison.png", operation)
}
