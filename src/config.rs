//! Configuration loading for comparison runs.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings for a comparison run.
///
/// Every key is optional; the defaults write the usual artifacts into the
/// current directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CompareConfig {
    /// Directory receiving the text summary and chart images
    pub output_dir: PathBuf,
    /// Chart width in pixels
    pub chart_width: u32,
    /// Chart height in pixels
    pub chart_height: u32,
    /// Operation kinds that never get a latency chart
    pub excluded_operations: Vec<String>,
    /// Operation markers recognized in addition to the built-in ones
    pub extra_operations: Vec<String>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            chart_width: 1000,
            chart_height: 600,
            excluded_operations: vec!["CLEANUP".to_string()],
            extra_operations: Vec::new(),
        }
    }
}

impl CompareConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the config.toml file
    ///
    /// # Returns
    /// * `Ok(CompareConfig)` if the file was successfully loaded, parsed and validated
    /// * `Err(String)` with a descriptive error message otherwise
    pub fn load(config_path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(config_path).map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: Self = toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), String> {
        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(format!(
                "Chart dimensions must be non-zero, got {}x{}",
                self.chart_width, self.chart_height
            ));
        }
        Ok(())
    }
}
