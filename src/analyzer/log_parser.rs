//! Classify individual benchmark log lines into structured `LineKind` values.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//! 1. *Status report*: line contains `current ops/sec`
//! 2. *Overall metric*: line starts with `[OVERALL]`
//! 3. *Operation line*: line starts with `[<OP>],` for a known marker; a
//!    recognized metric name makes it a summary metric, otherwise it is a
//!    latency time series point
//! 4. Anything else is unrecognized

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

use super::types::{LatencySample, LineKind, OperationKind, ThroughputSample};

/// Substring identifying a periodic status report.
const THROUGHPUT_MARKER: &str = "current ops/sec";

/// Prefix of whole-run metric lines.
const OVERALL_MARKER: &str = "[OVERALL]";

/// Substrings that turn an operation line into a summary metric.
pub const SUMMARY_METRIC_NAMES: [&str; 6] = [
    "Operations",
    "AverageLatency(us)",
    "MinLatency(us)",
    "MaxLatency(us)",
    "PercentileLatency(us)",
    "Return=",
];

/// Format of the wall-clock stamp at the start of status lines.
const WALL_CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S:%3f";

static ELAPSED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+) sec").expect("valid elapsed pattern"));
static OPERATIONS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+) operations").expect("valid operations pattern"));
static CURRENT_RATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*) current ops/sec;").expect("valid throughput pattern"));
static WALL_CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}:\d{3})").expect("valid wall clock pattern"));

/// Ordered set of matchers for benchmark log lines.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    /// `[<OP>],` prefix paired with the kind it produces.
    markers: Vec<(String, OperationKind)>,
}

impl LineClassifier {
    /// Create a classifier that knows the default operation markers.
    pub fn new() -> Self {
        Self::with_extra_operations::<&str>(&[])
    }

    /// Create a classifier that also recognizes the given marker names.
    ///
    /// Names are given without brackets (`"VERIFY"`). Duplicates of the
    /// default markers are ignored.
    pub fn with_extra_operations<S: AsRef<str>>(extra: &[S]) -> Self {
        let mut markers: Vec<(String, OperationKind)> = OperationKind::DEFAULTS
            .into_iter()
            .map(|kind| (format!("[{}],", kind), kind))
            .collect();

        for name in extra {
            let kind = OperationKind::from_name(name.as_ref().trim());
            if !markers.iter().any(|(_, known)| *known == kind) {
                markers.push((format!("[{}],", kind), kind));
            }
        }

        Self { markers }
    }

    /// Operation kinds this classifier recognizes, in marker order.
    pub fn operations(&self) -> impl Iterator<Item = &OperationKind> {
        self.markers.iter().map(|(_, kind)| kind)
    }

    /// Classify a single log line.
    ///
    /// # Parameters
    ///
    /// * `line` - One log line without its trailing newline
    ///
    /// # Returns
    ///
    /// `Ok(LineKind)` for every well-formed line, including
    /// `LineKind::Unrecognized`. `Err(reason)` when a line matched a rule
    /// but its fields could not be extracted.
    ///
    /// # Line Formats
    ///
    /// ```text
    /// Status report:
    /// 2024-03-01 10:00:10:123 10 sec: 48210 operations; 4821.3 current ops/sec; [READ: Count=24107, ...]
    ///
    /// Overall metric:
    /// [OVERALL], RunTime(ms), 60012.0
    ///
    /// Operation summary metric:
    /// [READ], AverageLatency(us), 412.77
    ///
    /// Operation latency point:
    /// [READ], 1000, 398.2
    /// ```
    pub fn classify(&self, line: &str) -> Result<LineKind, String> {
        if line.contains(THROUGHPUT_MARKER) {
            return parse_throughput(line).map(LineKind::Throughput);
        }

        if line.starts_with(OVERALL_MARKER) {
            let [_, name, value] = split_fields(line)?;
            return Ok(LineKind::Overall {
                name: name.trim().to_string(),
                value: parse_number(value, "metric value")?,
            });
        }

        if let Some(operation) = self.match_operation(line) {
            let [_, second, third] = split_fields(line)?;

            if SUMMARY_METRIC_NAMES.iter().any(|metric| line.contains(metric)) {
                return Ok(LineKind::CrudMetric {
                    operation,
                    name: second.trim().to_string(),
                    value: parse_number(third, "metric value")?,
                });
            }

            return Ok(LineKind::CrudLatency(LatencySample {
                operation,
                timestamp: parse_number(second, "timestamp")?,
                latency: parse_number(third, "latency")?,
            }));
        }

        Ok(LineKind::Unrecognized)
    }

    /// Find the operation marker the line starts with.
    fn match_operation(&self, line: &str) -> Option<OperationKind> {
        self.markers
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, kind)| kind.clone())
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract elapsed seconds, operation count and current throughput.
fn parse_throughput(line: &str) -> Result<ThroughputSample, String> {
    let elapsed_secs = capture(&ELAPSED_RE, line, "elapsed seconds")?;
    let operations = capture(&OPERATIONS_RE, line, "operation count")?;
    let throughput = capture(&CURRENT_RATE_RE, line, "current throughput")?;

    Ok(ThroughputSample {
        elapsed_secs: parse_number(elapsed_secs, "elapsed seconds")?,
        operations: parse_number(operations, "operation count")?,
        throughput: parse_number(throughput, "current throughput")?,
        wall_clock: parse_wall_clock(line),
    })
}

/// Extract the leading wall-clock stamp, if present.
fn parse_wall_clock(line: &str) -> Option<NaiveDateTime> {
    let stamp = WALL_CLOCK_RE.captures(line)?.get(1)?.as_str();
    NaiveDateTime::parse_from_str(stamp, WALL_CLOCK_FORMAT).ok()
}

/// Return the first capture group of `re` in `line`.
fn capture<'a>(re: &Regex, line: &'a str, what: &str) -> Result<&'a str, String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| format!("missing {}", what))
}

/// Split a line into exactly three comma-separated fields.
fn split_fields(line: &str) -> Result<[&str; 3], String> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    <[&str; 3]>::try_from(fields.as_slice())
        .map_err(|_| format!("expected 3 comma-separated fields, found {}", fields.len()))
}

/// Parse a trimmed numeric field.
fn parse_number<T: std::str::FromStr>(field: &str, what: &str) -> Result<T, String> {
    let field = field.trim();
    field.parse().map_err(|_| format!("invalid {}: {:?}", what, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_throughput_line() {
        let classifier = LineClassifier::new();
        let line = "2024-03-01 10:00:10:123 10 sec: 48210 operations; 4821.3 current ops/sec; est completion in 1 minute [READ: Count=24107, Max=9215, Min=180, Avg=402.16]";

        if let Ok(LineKind::Throughput(sample)) = classifier.classify(line) {
            assert_eq!(sample.elapsed_secs, 10);
            assert_eq!(sample.operations, 48210);
            assert_eq!(sample.throughput, 4821.3);
            let wall_clock = sample.wall_clock.expect("wall clock stamp");
            assert_eq!(wall_clock.second(), 10);
            assert_eq!(wall_clock.nanosecond(), 123_000_000);
        } else {
            panic!("Expected Throughput line");
        }
    }

    #[test]
    fn test_parse_throughput_without_wall_clock() {
        let classifier = LineClassifier::new();
        let line = " 20 sec: 100 operations; 5 current ops/sec;";

        assert_eq!(
            classifier.classify(line),
            Ok(LineKind::Throughput(ThroughputSample {
                elapsed_secs: 20,
                operations: 100,
                throughput: 5.0,
                wall_clock: None,
            }))
        );
    }

    #[test]
    fn test_throughput_missing_field_is_error() {
        let classifier = LineClassifier::new();
        let result = classifier.classify("10 sec: 4821.3 current ops/sec;");
        assert_eq!(result, Err("missing operation count".to_string()));
    }

    #[test]
    fn test_parse_overall_metric() {
        let classifier = LineClassifier::new();
        assert_eq!(
            classifier.classify("[OVERALL], RunTime(ms), 12345.0"),
            Ok(LineKind::Overall {
                name: "RunTime(ms)".to_string(),
                value: 12345.0,
            })
        );
    }

    #[test]
    fn test_overall_wrong_field_count_is_error() {
        let classifier = LineClassifier::new();
        let result = classifier.classify("[OVERALL], RunTime(ms)");
        assert_eq!(result, Err("expected 3 comma-separated fields, found 2".to_string()));
    }

    #[test]
    fn test_parse_crud_metric() {
        let classifier = LineClassifier::new();
        assert_eq!(
            classifier.classify("[READ], AverageLatency(us), 120.5"),
            Ok(LineKind::CrudMetric {
                operation: OperationKind::Read,
                name: "AverageLatency(us)".to_string(),
                value: 120.5,
            })
        );
        assert_eq!(
            classifier.classify("[UPDATE], Return=OK, 5000"),
            Ok(LineKind::CrudMetric {
                operation: OperationKind::Update,
                name: "Return=OK".to_string(),
                value: 5000.0,
            })
        );
        assert!(matches!(
            classifier.classify("[INSERT], 99thPercentileLatency(us), 870"),
            Ok(LineKind::CrudMetric { .. })
        ));
    }

    #[test]
    fn test_parse_crud_latency() {
        let classifier = LineClassifier::new();
        assert_eq!(
            classifier.classify("[READ], 1000, 250.3"),
            Ok(LineKind::CrudLatency(LatencySample {
                operation: OperationKind::Read,
                timestamp: 1000,
                latency: 250.3,
            }))
        );
    }

    #[test]
    fn test_crud_latency_bad_timestamp_is_error() {
        let classifier = LineClassifier::new();
        let result = classifier.classify("[READ], >1000, 12");
        assert_eq!(result, Err("invalid timestamp: \">1000\"".to_string()));
    }

    #[test]
    fn test_marker_requires_comma() {
        let classifier = LineClassifier::new();
        assert!(matches!(
            classifier.classify("[READ-MODIFY-WRITE], 2000, 10.0"),
            Ok(LineKind::CrudLatency(LatencySample {
                operation: OperationKind::ReadModifyWrite,
                ..
            }))
        ));
        assert_eq!(classifier.classify("[READ] 1000 250.3"), Ok(LineKind::Unrecognized));
    }

    #[test]
    fn test_throughput_takes_precedence() {
        let classifier = LineClassifier::new();
        let line = "[OVERALL] 10 sec: 10 operations; 1.0 current ops/sec;";
        assert!(matches!(classifier.classify(line), Ok(LineKind::Throughput(_))));
    }

    #[test]
    fn test_extra_operations() {
        let classifier = LineClassifier::with_extra_operations(&["VERIFY", "READ"]);
        assert_eq!(classifier.operations().count(), OperationKind::DEFAULTS.len() + 1);
        assert_eq!(
            classifier.classify("[VERIFY], 5, 1.5"),
            Ok(LineKind::CrudLatency(LatencySample {
                operation: OperationKind::Other("VERIFY".to_string()),
                timestamp: 5,
                latency: 1.5,
            }))
        );
        assert_eq!(LineClassifier::new().classify("[VERIFY], 5, 1.5"), Ok(LineKind::Unrecognized));
    }

    #[test]
    fn test_parse_unrecognized_line() {
        let classifier = LineClassifier::new();
        assert_eq!(classifier.classify("Loading workload..."), Ok(LineKind::Unrecognized));
        assert_eq!(classifier.classify("[CLEANUP] starting"), Ok(LineKind::Unrecognized));
    }
}
