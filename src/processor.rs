//! Analysis pipeline.
//!
//! Orchestrates a complete run: dataset resolution, table loading,
//! projection, damage normalization, the six aggregations and report
//! output. Parsing and aggregation are CPU bound and run on the blocking
//! thread pool; nothing is written until every stage has succeeded.

use crate::aggregator::{aggregate_all, distinct_event_types};
use crate::config::{AnalysisConfig, UnknownCodePolicy};
use crate::error::{Result, StormError};
use crate::loader::{DatasetSource, read_table};
use crate::models::{ImpactSummary, ProcessingStats};
use crate::normalizer::{MultiplierTable, Normalizer};
use crate::projector::project;
use crate::report::{ReportWriter, print_stats, print_summary};

use colored::*;
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::time::Instant;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Rankings and statistics of a finished run
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub summary: ImpactSummary,
    pub stats: ProcessingStats,
    /// Files written to the output directory, if one was configured
    pub written: Vec<PathBuf>,
}

/// Project, normalize and aggregate an already loaded table
pub fn analyze_frame(
    frame: &DataFrame,
    multipliers: &MultiplierTable,
    policy: UnknownCodePolicy,
) -> Result<(ImpactSummary, ProcessingStats)> {
    let rows_loaded = frame.height();
    let events = project(frame)?;

    let outcome = Normalizer::new(multipliers, policy).normalize_all(events)?;
    let summary = aggregate_all(&outcome.events)?;

    let stats = ProcessingStats {
        rows_loaded,
        events_normalized: outcome.events.len(),
        events_skipped: outcome.skipped,
        distinct_event_types: distinct_event_types(&outcome.events),
        ..Default::default()
    };
    Ok((summary, stats))
}

/// Main driver for a storm impact analysis
pub struct StormAnalysis {
    config: AnalysisConfig,
    source: DatasetSource,
    multipliers: MultiplierTable,
}

impl StormAnalysis {
    /// Create an analysis using the standard exponent code table
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let source = DatasetSource::from_config(&config);
        Ok(Self {
            config,
            source,
            multipliers: MultiplierTable::standard().clone(),
        })
    }

    /// Replace the exponent code table
    pub fn with_multiplier_table(mut self, multipliers: MultiplierTable) -> Self {
        self.multipliers = multipliers;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every stage and write reports
    pub async fn run(&self) -> Result<AnalysisOutcome> {
        self.run_with_cancellation(CancellationToken::new()).await
    }

    /// Run every stage, stopping with [`StormError::Interrupted`] once `token`
    /// is cancelled. A cancelled run never leaves report files behind.
    pub async fn run_with_cancellation(
        &self,
        token: CancellationToken,
    ) -> Result<AnalysisOutcome> {
        let start_time = Instant::now();
        println!("{}", "Starting storm impact analysis".bright_green().bold());

        println!("\n{}", "Resolving dataset...".bright_yellow());
        let dataset_path = tokio::select! {
            resolved = self.source.resolve() => resolved?,
            _ = token.cancelled() => {
                warn!("Cancelled while resolving the dataset");
                return Err(StormError::interrupted("cancelled while resolving the dataset"));
            }
        };
        println!(
            "  {} {}",
            "Dataset:".bright_cyan(),
            dataset_path.display()
        );

        println!("\n{}", "Loading and aggregating events...".bright_yellow());
        let multipliers = self.multipliers.clone();
        let policy = self.config.unknown_code_policy;
        let (summary, stats) = task::spawn_blocking({
            let dataset_path = dataset_path.clone();
            move || {
                let frame = read_table(&dataset_path)?;
                info!("Loaded {} rows from {}", frame.height(), dataset_path.display());
                analyze_frame(&frame, &multipliers, policy)
            }
        })
        .await
        .map_err(|e| StormError::TaskFailed {
            reason: format!("analysis of {} failed: {}", dataset_path.display(), e),
        })??;

        if token.is_cancelled() {
            return Err(StormError::interrupted("cancelled before writing reports"));
        }

        let mut stats = ProcessingStats {
            dataset_path,
            processing_time_ms: start_time.elapsed().as_millis(),
            ..stats
        };
        debug!("Analysis stats: {:?}", stats);

        print_summary(&summary, self.config.top_n);

        let written = match ReportWriter::from_config(&self.config) {
            Some(writer) => {
                println!("\n{}", "Writing reports...".bright_yellow());
                let written = task::spawn_blocking({
                    let summary = summary.clone();
                    let stats = stats.clone();
                    let token = token.clone();
                    move || writer.write_cancellable(&summary, &stats, &token)
                })
                .await
                .map_err(|e| StormError::TaskFailed {
                    reason: format!("report writing failed: {}", e),
                })??;
                println!(
                    "  {} {} files",
                    "Wrote".bright_green(),
                    written.len().to_string().bright_white().bold()
                );
                written
            }
            None => Vec::new(),
        };

        stats.processing_time_ms = start_time.elapsed().as_millis();
        print_stats(&stats);

        Ok(AnalysisOutcome {
            summary,
            stats,
            written,
        })
    }
}

#[cfg(test)]
mod tests;
