//! Command-line interface components.

use crate::config::{AnalysisConfig, UnknownCodePolicy};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "storm-impact")]
#[command(about = "Rank NOAA storm event types by health impact and economic damage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Local storm data file, plain or bzip2 compressed (downloaded and cached if not provided)
    #[arg(value_name = "DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// URL of the compressed storm dataset
    #[arg(long)]
    pub url: Option<String>,

    /// Directory for the downloaded dataset
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Directory for CSV, JSON and SVG reports
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Number of event types shown per ranking
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// Drop records with unknown damage exponent codes instead of aborting
    #[arg(long)]
    pub skip_unknown_codes: bool,

    /// Do not render SVG charts
    #[arg(long)]
    pub no_charts: bool,

    /// TOML configuration file; command-line flags take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Tracing level for the crate's own targets
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Build the run configuration: file values first, then flags
    pub fn to_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_toml_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(path) = &self.data_file {
            config = config.with_data_file(path.clone());
        }
        if let Some(url) = &self.url {
            config = config.with_url(url.clone());
        }
        if let Some(dir) = &self.cache_dir {
            config = config.with_cache_dir(dir.clone());
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir.clone());
        }
        if let Some(top) = self.top {
            config = config.with_top_n(top);
        }
        if self.skip_unknown_codes {
            config = config.with_unknown_code_policy(UnknownCodePolicy::Skip);
        }
        if self.no_charts {
            config = config.without_charts();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["storm-impact"]);
        let config = args.to_config().unwrap();
        assert!(config.data_file.is_none());
        assert!(config.output_dir.is_none());
        assert_eq!(config.top_n, 5);
        assert_eq!(config.unknown_code_policy, UnknownCodePolicy::Abort);
        assert!(config.render_charts);
        assert_eq!(args.log_level(), "info");
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("storm.toml");
        std::fs::write(&file, "top_n = 12\nrender_charts = true\n").unwrap();

        let args = Args::parse_from([
            "storm-impact",
            "data.csv.bz2",
            "--config",
            file.to_str().unwrap(),
            "-n",
            "3",
            "--skip-unknown-codes",
            "--no-charts",
            "-o",
            "out",
            "-v",
        ]);
        let config = args.to_config().unwrap();

        assert_eq!(config.data_file, Some(PathBuf::from("data.csv.bz2")));
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.top_n, 3);
        assert_eq!(config.unknown_code_policy, UnknownCodePolicy::Skip);
        assert!(!config.render_charts);
        assert_eq!(args.log_level(), "debug");
    }

    #[test]
    fn test_zero_top_rejected() {
        let args = Args::parse_from(["storm-impact", "--top", "0"]);
        assert!(args.to_config().is_err());
    }
}
