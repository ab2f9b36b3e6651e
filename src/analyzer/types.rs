//! Type definitions specific to the analyzer module.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;

/// Summary statistics keyed by metric name.
///
/// Overall metrics use the bare name (`RunTime(ms)`), per-operation metrics
/// use `<OP>_<name>` (`READ_AverageLatency(us)`). Later lines overwrite
/// earlier ones with the same key.
pub type SummaryMetrics = BTreeMap<String, f64>;

/// Operation kinds tagged in per-operation log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    Read,
    Insert,
    Update,
    Delete,
    Scan,
    ReadModifyWrite,
    /// Housekeeping phase at the end of a run; never charted by default.
    Cleanup,
    /// A marker added through configuration, carried verbatim.
    Other(String),
}

impl OperationKind {
    /// Operation kinds recognized without any configuration.
    pub const DEFAULTS: [OperationKind; 7] = [
        OperationKind::Read,
        OperationKind::Insert,
        OperationKind::Update,
        OperationKind::Delete,
        OperationKind::Scan,
        OperationKind::ReadModifyWrite,
        OperationKind::Cleanup,
    ];

    /// Map a marker name (without brackets) to its kind.
    pub fn from_name(name: &str) -> Self {
        match name {
            "READ" => OperationKind::Read,
            "INSERT" => OperationKind::Insert,
            "UPDATE" => OperationKind::Update,
            "DELETE" => OperationKind::Delete,
            "SCAN" => OperationKind::Scan,
            "READ-MODIFY-WRITE" => OperationKind::ReadModifyWrite,
            "CLEANUP" => OperationKind::Cleanup,
            other => OperationKind::Other(other.to_string()),
        }
    }

    /// Name as it appears inside the `[...]` marker.
    pub fn as_str(&self) -> &str {
        match self {
            OperationKind::Read => "READ",
            OperationKind::Insert => "INSERT",
            OperationKind::Update => "UPDATE",
            OperationKind::Delete => "DELETE",
            OperationKind::Scan => "SCAN",
            OperationKind::ReadModifyWrite => "READ-MODIFY-WRITE",
            OperationKind::Cleanup => "CLEANUP",
            OperationKind::Other(name) => name,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One periodic status report of the workload generator.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputSample {
    /// Seconds elapsed since the run started.
    pub elapsed_secs: u64,
    /// Operations completed so far.
    pub operations: u64,
    /// Throughput over the last reporting interval (ops/sec).
    pub throughput: f64,
    /// Wall-clock stamp leading the status line, when the tool printed one.
    pub wall_clock: Option<NaiveDateTime>,
}

/// One point of a per-operation latency time series.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySample {
    pub operation: OperationKind,
    pub timestamp: u64,
    /// Latency in microseconds.
    pub latency: f64,
}

/// Classification of a single log line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// Periodic status report.
    Throughput(ThroughputSample),
    /// `[OVERALL], <name>, <value>`
    Overall { name: String, value: f64 },
    /// `[<OP>], <metric>, <value>` where the metric is a recognized summary statistic.
    CrudMetric {
        operation: OperationKind,
        name: String,
        value: f64,
    },
    /// `[<OP>], <timestamp>, <latency>`
    CrudLatency(LatencySample),
    /// Anything else; ignored by the parser.
    Unrecognized,
}

/// Everything extracted from one benchmark log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    /// Status reports in file order.
    pub throughput: Vec<ThroughputSample>,
    /// Latency time series points in file order.
    pub latencies: Vec<LatencySample>,
    pub metrics: SummaryMetrics,
    /// Non-blank lines that matched no rule.
    pub unrecognized_lines: usize,
}

impl ParsedLog {
    /// Fold one classified line into the accumulated tables.
    pub fn record(&mut self, kind: LineKind) {
        match kind {
            LineKind::Throughput(sample) => self.throughput.push(sample),
            LineKind::Overall { name, value } => {
                self.metrics.insert(name, value);
            }
            LineKind::CrudMetric { operation, name, value } => {
                self.metrics.insert(format!("{}_{}", operation, name), value);
            }
            LineKind::CrudLatency(sample) => self.latencies.push(sample),
            LineKind::Unrecognized => self.unrecognized_lines += 1,
        }
    }

    /// Latency samples of a single operation kind, in file order.
    pub fn latencies_for<'a>(&'a self, operation: &'a OperationKind) -> impl Iterator<Item = &'a LatencySample> + 'a {
        self.latencies.iter().filter(move |s| &s.operation == operation)
    }

    /// First and last wall-clock stamps seen in status lines.
    pub fn wall_clock_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut stamps = self.throughput.iter().filter_map(|s| s.wall_clock);
        let first = stamps.next()?;
        let last = stamps.last().unwrap_or(first);
        Some((first, last))
    }
}
