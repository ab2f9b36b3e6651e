//! Side-by-side comparison of summary metrics.

use serde::Serialize;
use std::io::{self, Write};

use crate::analyzer::SummaryMetrics;

/// Header line of the text summary.
pub const METRICS_HEADER: &str = "=== Global Metrics ===";

/// Placeholder for a metric one of the runs does not report.
pub const NOT_APPLICABLE: &str = "N/A";

/// One metric key with the value reported by each run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub key: String,
    pub left: Option<f64>,
    pub right: Option<f64>,
}

/// Pair up the metrics of two runs.
///
/// Returns one row per key present in either run, sorted by key.
pub fn compare_metrics(left: &SummaryMetrics, right: &SummaryMetrics) -> Vec<MetricRow> {
    let mut keys: Vec<&String> = left.keys().chain(right.keys()).collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .map(|key| MetricRow {
            key: key.clone(),
            left: left.get(key).copied(),
            right: right.get(key).copied(),
        })
        .collect()
}

/// Render a metric value; integral values keep a trailing `.0`.
///
/// Exponents carry a sign and at least two digits (`1e-05`, `1e+16`), and
/// NaN prints as `nan`.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_nan() => "nan".to_string(),
        Some(v) => {
            let shortest = format!("{:?}", v);
            match shortest.split_once('e') {
                Some((mantissa, exponent)) => {
                    let (sign, digits) = match exponent.strip_prefix('-') {
                        Some(digits) => ('-', digits),
                        None => ('+', exponent),
                    };
                    format!("{}e{}{:0>2}", mantissa, sign, digits)
                }
                None => shortest,
            }
        }
        None => NOT_APPLICABLE.to_string(),
    }
}

/// Write the text summary: header, one `key: left vs right` line per row, blank line.
pub fn write_metrics_report<W: Write>(rows: &[MetricRow], out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", METRICS_HEADER)?;
    for row in rows {
        writeln!(out, "{}: {} vs {}", row.key, format_value(row.left), format_value(row.right))?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(entries: &[(&str, f64)]) -> SummaryMetrics {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn report(rows: &[MetricRow]) -> String {
        let mut out = Vec::new();
        write_metrics_report(rows, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_disjoint_keys() {
        let rows = compare_metrics(&metrics(&[("X", 1.0)]), &metrics(&[("Y", 2.0)]));
        assert_eq!(report(&rows), "=== Global Metrics ===\nX: 1.0 vs N/A\nY: N/A vs 2.0\n\n");
    }

    #[test]
    fn test_shared_keys_sorted_once() {
        let left = metrics(&[("RunTime(ms)", 12345.0), ("READ_AverageLatency(us)", 120.5)]);
        let right = metrics(&[("READ_AverageLatency(us)", 98.25), ("INSERT_Operations", 10.0)]);
        let rows = compare_metrics(&left, &right);

        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["INSERT_Operations", "READ_AverageLatency(us)", "RunTime(ms)"]);
        assert_eq!(
            rows[1],
            MetricRow {
                key: "READ_AverageLatency(us)".to_string(),
                left: Some(120.5),
                right: Some(98.25),
            }
        );
        assert_eq!(
            report(&rows),
            "=== Global Metrics ===\n\
             INSERT_Operations: N/A vs 10.0\n\
             READ_AverageLatency(us): 120.5 vs 98.25\n\
             RunTime(ms): 12345.0 vs N/A\n\n"
        );
    }

    #[test]
    fn test_empty_runs() {
        let rows = compare_metrics(&SummaryMetrics::new(), &SummaryMetrics::new());
        assert!(rows.is_empty());
        assert_eq!(report(&rows), "=== Global Metrics ===\n\n");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(12345.0)), "12345.0");
        assert_eq!(format_value(Some(0.1)), "0.1");
        assert_eq!(format_value(None), "N/A");
    }

    #[test]
    fn test_format_value_exponents() {
        assert_eq!(format_value(Some(1e-5)), "1e-05");
        assert_eq!(format_value(Some(1e16)), "1e+16");
        assert_eq!(format_value(Some(1.2345678901234568e17)), "1.2345678901234568e+17");
        assert_eq!(format_value(Some(2.5e-300)), "2.5e-300");
        assert_eq!(format_value(Some(0.0001)), "0.0001");
        assert_eq!(format_value(Some(1e15)), "1000000000000000.0");
        assert_eq!(format_value(Some(f64::INFINITY)), "inf");
        assert_eq!(format_value(Some(f64::NAN)), "nan");
    }
}
