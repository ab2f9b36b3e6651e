//! Analyzer module for benchmark log parsing.
//!
//! Provides functionality for:
//! - Classifying single log lines by an ordered set of matchers
//! - Reading a whole log into throughput, latency and summary tables
//!
//! Each parse is independent; nothing is shared between invocations.

pub mod log_loader;
pub mod log_parser;
pub mod types;

pub use log_loader::{LogParseError, parse_log_file};
pub use log_parser::LineClassifier;
pub use types::{OperationKind, ParsedLog, SummaryMetrics};
