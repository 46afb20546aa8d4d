//! Configuration management and validation.
//!
//! Provides the analysis configuration: where the dataset comes from,
//! where it is cached, how unknown damage codes are handled and how the
//! results are presented. Values can be loaded from a TOML file and
//! overridden on the command line.

use crate::constants::{
    CACHE_DIR_NAME, DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH, DEFAULT_DATASET_FILE,
    DEFAULT_DATASET_URL, DEFAULT_TOP_N, FALLBACK_CACHE_DIR,
};
use crate::error::{Result, StormError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What to do with a record whose damage exponent code is not in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCodePolicy {
    /// Fail the whole run on the first unknown code
    #[default]
    Abort,
    /// Drop the record with a warning and keep going
    Skip,
}

/// Global configuration for a storm impact analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Remote location of the compressed dataset
    pub url: String,

    /// Directory holding the downloaded dataset
    pub cache_dir: PathBuf,

    /// File name of the cached dataset inside `cache_dir`
    pub file_name: String,

    /// Explicit local dataset file; skips the cache and the download
    pub data_file: Option<PathBuf>,

    /// Directory for CSV, JSON and chart output (terminal only when unset)
    pub output_dir: Option<PathBuf>,

    /// Number of event types shown per ranking
    pub top_n: usize,

    /// Handling of unknown damage exponent codes
    pub unknown_code_policy: UnknownCodePolicy,

    /// Render SVG bar charts into `output_dir`
    pub render_charts: bool,

    /// Chart width in pixels
    pub chart_width: u32,

    /// Chart height in pixels
    pub chart_height: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATASET_URL.to_string(),
            cache_dir: default_cache_dir(),
            file_name: DEFAULT_DATASET_FILE.to_string(),
            data_file: None,
            output_dir: None,
            top_n: DEFAULT_TOP_N,
            unknown_code_policy: UnknownCodePolicy::Abort,
            render_charts: true,
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
        }
    }
}

/// User cache directory for downloads, or a local fallback
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(CACHE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
}

impl AnalysisConfig {
    /// Load configuration from a TOML file; missing keys take default values
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = toml::from_str(&text).map_err(|e| {
            StormError::configuration(format!("{}: {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject settings that cannot produce a report
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(StormError::configuration("top_n must be at least 1"));
        }
        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(StormError::configuration(format!(
                "chart size must be positive, got {}x{}",
                self.chart_width, self.chart_height
            )));
        }
        if self.data_file.is_none() && self.url.trim().is_empty() {
            return Err(StormError::configuration(
                "either a data file or a dataset URL is required",
            ));
        }
        Ok(())
    }

    /// Path of the cached dataset
    pub fn cached_dataset_path(&self) -> PathBuf {
        self.cache_dir.join(&self.file_name)
    }

    pub fn with_data_file(mut self, path: PathBuf) -> Self {
        self.data_file = Some(path);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = dir;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_unknown_code_policy(mut self, policy: UnknownCodePolicy) -> Self {
        self.unknown_code_policy = policy;
        self
    }

    /// Disable SVG chart rendering
    pub fn without_charts(mut self) -> Self {
        self.render_charts = false;
        self
    }
}
