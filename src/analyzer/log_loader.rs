//! Buffered reading of benchmark log files and accumulation into `ParsedLog`.
//!
//! A log is consumed in a single forward pass. Each non-blank line is
//! classified and folded into the growing tables; the first malformed line
//! aborts the parse with its file name and line number.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::log_parser::LineClassifier;
use super::types::{LineKind, ParsedLog};

/// Buffer size for reading log files (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Error type for log parsing failures.
#[derive(Debug)]
pub enum LogParseError {
    /// The file could not be opened or read.
    Io { path: PathBuf, source: io::Error },
    /// A line matched a rule but its fields could not be extracted.
    MalformedLine {
        path: PathBuf,
        line_number: usize,
        line: String,
        reason: String,
    },
}

impl fmt::Display for LogParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogParseError::Io { path, source } => write!(f, "Failed to read {}: {}", path.display(), source),
            LogParseError::MalformedLine {
                path,
                line_number,
                line,
                reason,
            } => write!(f, "Malformed log line {}:{} ({}): {}", path.display(), line_number, reason, line),
        }
    }
}

impl std::error::Error for LogParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogParseError::Io { source, .. } => Some(source),
            LogParseError::MalformedLine { .. } => None,
        }
    }
}

/// Line reader that tracks 1-based line numbers and skips blank lines.
pub struct LogLoader<R> {
    reader: R,
    line_number: usize,
    line_buffer: String,
}

impl<R: BufRead> LogLoader<R> {
    /// Wrap an already buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            line_buffer: String::with_capacity(512),
        }
    }

    /// Read the next non-blank line, without its line terminator.
    ///
    /// # Returns
    ///
    /// `Ok(Some((line_number, line)))` while lines remain, `Ok(None)` at EOF.
    pub fn next_line(&mut self) -> Result<Option<(usize, &str)>, io::Error> {
        loop {
            self.line_buffer.clear();
            if self.reader.read_line(&mut self.line_buffer)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed_len = self.line_buffer.trim_end_matches(['\r', '\n']).len();
            self.line_buffer.truncate(trimmed_len);
            if !self.line_buffer.trim().is_empty() {
                return Ok(Some((self.line_number, &self.line_buffer)));
            }
        }
    }
}

/// Parse a benchmark log file.
///
/// # Parameters
///
/// * `path` - Path to the log file
/// * `classifier` - Line matchers to apply
///
/// # Returns
///
/// The accumulated throughput, latency and summary tables, or the first
/// I/O error or malformed line encountered.
pub fn parse_log_file(path: &Path, classifier: &LineClassifier) -> Result<ParsedLog, LogParseError> {
    let file = File::open(path).map_err(|source| LogParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_log_reader(BufReader::with_capacity(BUFFER_SIZE, file), path, classifier)?;

    log::info!(
        "Parsed {}: {} throughput samples, {} latency samples, {} summary metrics",
        path.display(),
        parsed.throughput.len(),
        parsed.latencies.len(),
        parsed.metrics.len()
    );
    if parsed.unrecognized_lines > 0 {
        log::info!("Ignored {} unrecognized lines in {}", parsed.unrecognized_lines, path.display());
    }

    Ok(parsed)
}

/// Parse a benchmark log from any buffered reader.
///
/// `path` only names the input in errors and log messages.
pub fn parse_log_reader<R: BufRead>(reader: R, path: &Path, classifier: &LineClassifier) -> Result<ParsedLog, LogParseError> {
    let mut loader = LogLoader::new(reader);
    let mut parsed = ParsedLog::default();

    loop {
        let (line_number, line) = match loader.next_line() {
            Ok(Some(next)) => next,
            Ok(None) => break,
            Err(source) => {
                return Err(LogParseError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        match classifier.classify(line) {
            Ok(LineKind::Unrecognized) => {
                log::debug!("Unrecognized log line {}:{}: {}", path.display(), line_number, line);
                parsed.record(LineKind::Unrecognized);
            }
            Ok(kind) => parsed.record(kind),
            Err(reason) => {
                return Err(LogParseError::MalformedLine {
                    path: path.to_path_buf(),
                    line_number,
                    line: line.to_string(),
                    reason,
                });
            }
        }
    }

    Ok(parsed)
}
