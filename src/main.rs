use anyhow::Context;
use clap::{ArgAction, Parser};
use env_logger::Builder;
use log::{LevelFilter, info};
use std::path::PathBuf;

mod analyzer;
mod config;
mod report;

use config::CompareConfig;
use report::{CompareOptions, compare_runs};

#[derive(Parser, Debug)]
#[command(name = "ycsb-compare")]
#[command(about = "Compare two YCSB benchmark logs: metric summary plus throughput and latency charts")]
struct Args {
    /// Log file of the first run.
    #[arg(value_name = "LEFT")]
    left: PathBuf,

    /// Log file of the second run.
    #[arg(value_name = "RIGHT")]
    right: PathBuf,

    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the summary and chart images (overrides the config file).
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Also write a JSON comparison report to this file.
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Only write the text summary.
    #[arg(long, default_value_t = false)]
    no_charts: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> anyhow::Result<CompareOptions> {
        let config = match &self.config {
            Some(path) => CompareConfig::load(path).map_err(anyhow::Error::msg).with_context(|| format!("Invalid config {}", path.display()))?,
            None => CompareConfig::default(),
        };

        let mut options = CompareOptions::from(&config);
        if let Some(dir) = &self.output_dir {
            options.output_dir = dir.clone();
        }
        options.render_charts = !self.no_charts;
        options.json_report = self.json.clone();
        Ok(options)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new().filter_level(LevelFilter::Warn).filter(Some("ycsb_compare"), level).init();

    let options = args.options()?;
    info!("Comparing {} vs {}", args.left.display(), args.right.display());

    let outcome = compare_runs(&args.left, &args.right, &options)?;
    info!("Wrote {} files to {}", outcome.written.len(), options.output_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["ycsb-compare", "a.dat", "b.dat"]).unwrap();
        let options = args.options().unwrap();

        assert_eq!(args.left, PathBuf::from("a.dat"));
        assert_eq!(args.right, PathBuf::from("b.dat"));
        assert_eq!(options.output_dir, PathBuf::from("."));
        assert_eq!(options.chart_size, (1000, 600));
        assert!(options.render_charts);
        assert!(options.json_report.is_none());
    }

    #[test]
    fn test_both_logs_required() {
        assert!(Args::try_parse_from(["ycsb-compare", "a.dat"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"output-dir = \"from-config\"\nchart-width = 1200\n").unwrap();
        let config = file.path().to_string_lossy().into_owned();

        let args = Args::try_parse_from([
            "ycsb-compare",
            "a.dat",
            "b.dat",
            "--config",
            config.as_str(),
            "-o",
            "from-flag",
            "--json",
            "report.json",
            "--no-charts",
            "-vv",
        ])
        .unwrap();
        let options = args.options().unwrap();

        assert_eq!(args.verbose, 2);
        assert_eq!(options.output_dir, PathBuf::from("from-flag"));
        assert_eq!(options.chart_size, (1200, 600));
        assert!(!options.render_charts);
        assert_eq!(options.json_report, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn test_invalid_config_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"chart-width = 0\n").unwrap();
        let config = file.path().to_string_lossy().into_owned();

        let args = Args::try_parse_from(["ycsb-compare", "a.dat", "b.dat", "--config", config.as_str()]).unwrap();
        let err = args.options().unwrap_err();
        assert!(format!("{:#}", err).contains("non-zero"));
    }
}
