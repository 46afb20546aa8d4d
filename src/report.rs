//! Presentation of aggregation results.
//!
//! Prints the leading event types of every ranking to the terminal and,
//! when an output directory is configured, writes each full ranking as
//! CSV, a JSON summary of the top rows, and one SVG chart per measure.
//! Files are staged in a hidden sibling directory and only moved into the
//! output directory once all of them have been written.

use crate::aggregator::top_n;
use crate::chart::render_bar_chart;
use crate::config::AnalysisConfig;
use crate::constants::{
    STAGING_DIR_SUFFIX, SUMMARY_FILE_NAME, USD_PER_BILLION, USD_PER_MILLION,
};
use crate::error::{Result, StormError};
use crate::models::{AggregateRow, ImpactSummary, MeasureTotal, ProcessingStats, Ranking};

use chrono::{DateTime, Utc};
use colored::*;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Format a total for display: counts as integers, USD scaled to B/M
pub fn format_total(total: &MeasureTotal) -> String {
    match *total {
        MeasureTotal::Count(n) => n.to_string(),
        MeasureTotal::Usd(v) if v >= USD_PER_BILLION => format!("${:.2}B", v / USD_PER_BILLION),
        MeasureTotal::Usd(v) if v >= USD_PER_MILLION => format!("${:.2}M", v / USD_PER_MILLION),
        MeasureTotal::Usd(v) => format!("${:.2}", v),
    }
}

/// Print the leading rows of every ranking
pub fn print_summary(summary: &ImpactSummary, top: usize) {
    for ranking in &summary.rankings {
        println!(
            "\n{} {}",
            "Top event types by".bright_green().bold(),
            ranking.measure.label().bright_green().bold()
        );

        let rows = top_n(&ranking.rows, top);
        if rows.is_empty() {
            println!("  {}", "no event type has a positive total".bright_black());
            continue;
        }

        let width = rows.iter().map(|r| r.event_type.len()).max().unwrap_or(0);
        for (i, row) in rows.iter().enumerate() {
            println!(
                "  {}. {:<width$}  {}",
                (i + 1).to_string().bright_yellow().bold(),
                row.event_type.bright_cyan(),
                format_total(&row.total).bright_white(),
                width = width
            );
        }
    }
}

/// Print run statistics
pub fn print_stats(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Dataset:".bright_cyan(),
        stats.dataset_path.display()
    );
    println!(
        "  {} {}",
        "Rows loaded:".bright_cyan(),
        stats.rows_loaded.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Events normalized:".bright_cyan(),
        stats.events_normalized.to_string().bright_white()
    );
    if stats.events_skipped > 0 {
        println!(
            "  {} {}",
            "Events skipped:".bright_red(),
            stats.events_skipped.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Distinct event types:".bright_cyan(),
        stats.distinct_event_types.to_string().bright_white()
    );
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    generated_at: DateTime<Utc>,
    top_n: usize,
    stats: &'a ProcessingStats,
    rankings: Vec<Ranking>,
}

/// Writes ranking files into an output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    top_n: usize,
    render_charts: bool,
    chart_size: (u32, u32),
}

impl ReportWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            top_n: crate::constants::DEFAULT_TOP_N,
            render_charts: true,
            chart_size: (
                crate::constants::DEFAULT_CHART_WIDTH,
                crate::constants::DEFAULT_CHART_HEIGHT,
            ),
        }
    }

    /// Writer for `config.output_dir`, if one is set
    pub fn from_config(config: &AnalysisConfig) -> Option<Self> {
        config.output_dir.as_ref().map(|dir| Self {
            output_dir: dir.clone(),
            top_n: config.top_n,
            render_charts: config.render_charts,
            chart_size: (config.chart_width, config.chart_height),
        })
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn without_charts(mut self) -> Self {
        self.render_charts = false;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every output file, returning the paths written
    pub fn write(&self, summary: &ImpactSummary, stats: &ProcessingStats) -> Result<Vec<PathBuf>> {
        self.write_cancellable(summary, stats, &CancellationToken::new())
    }

    /// Write every output file unless `token` is cancelled first.
    ///
    /// On cancellation or failure the staging directory is removed and the
    /// output directory is left as it was.
    pub fn write_cancellable(
        &self,
        summary: &ImpactSummary,
        stats: &ProcessingStats,
        token: &CancellationToken,
    ) -> Result<Vec<PathBuf>> {
        let staging = self.staging_dir();
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        let names = match self.write_files(&staging, summary, stats, token) {
            Ok(names) => names,
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&staging) {
                    warn!("Could not remove {}: {}", staging.display(), cleanup);
                }
                return Err(e);
            }
        };

        fs::create_dir_all(&self.output_dir)?;
        let mut written = Vec::with_capacity(names.len());
        for name in names {
            let target = self.output_dir.join(&name);
            fs::rename(staging.join(&name), &target)?;
            written.push(target);
        }
        fs::remove_dir(&staging)?;

        info!(
            "Wrote {} report files to {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }

    /// Hidden sibling of the output directory
    fn staging_dir(&self) -> PathBuf {
        match self.output_dir.file_name() {
            Some(name) => self.output_dir.with_file_name(format!(
                ".{}{}",
                name.to_string_lossy(),
                STAGING_DIR_SUFFIX
            )),
            None => self
                .output_dir
                .join(format!(".storm-impact{}", STAGING_DIR_SUFFIX)),
        }
    }

    fn write_files(
        &self,
        dir: &Path,
        summary: &ImpactSummary,
        stats: &ProcessingStats,
        token: &CancellationToken,
    ) -> Result<Vec<String>> {
        let check = || {
            if token.is_cancelled() {
                Err(StormError::interrupted("report writing cancelled"))
            } else {
                Ok(())
            }
        };
        let mut names = Vec::new();

        for ranking in &summary.rankings {
            check()?;
            let csv_name = format!("{}.csv", ranking.measure.slug());
            write_ranking_csv(&dir.join(&csv_name), &ranking.rows)?;
            names.push(csv_name);

            if self.render_charts {
                check()?;
                let svg_name = format!("{}.svg", ranking.measure.slug());
                render_bar_chart(
                    &dir.join(&svg_name),
                    ranking.measure,
                    top_n(&ranking.rows, self.top_n),
                    self.chart_size,
                )?;
                names.push(svg_name);
            }
        }

        check()?;
        let document = SummaryDocument {
            generated_at: Utc::now(),
            top_n: self.top_n,
            stats,
            rankings: summary
                .rankings
                .iter()
                .map(|r| Ranking {
                    measure: r.measure,
                    rows: top_n(&r.rows, self.top_n).to_vec(),
                })
                .collect(),
        };
        let file = File::create(dir.join(SUMMARY_FILE_NAME))?;
        serde_json::to_writer_pretty(file, &document).map_err(std::io::Error::from)?;
        names.push(SUMMARY_FILE_NAME.to_string());

        // Last chance to back out before anything reaches the output directory
        check()?;
        Ok(names)
    }
}

/// Write a full ranking as `event_type,total`
pub fn write_ranking_csv(path: &Path, rows: &[AggregateRow]) -> Result<()> {
    let mut frame = ranking_frame(rows)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame)?;
    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Ranking as a two-column frame; count measures stay integral
fn ranking_frame(rows: &[AggregateRow]) -> Result<DataFrame> {
    let names: Vec<&str> = rows.iter().map(|r| r.event_type.as_str()).collect();
    let all_counts = rows
        .iter()
        .all(|r| matches!(r.total, MeasureTotal::Count(_)));

    let frame = if all_counts {
        let totals: Vec<u64> = rows
            .iter()
            .map(|r| match r.total {
                MeasureTotal::Count(n) => n,
                MeasureTotal::Usd(v) => v as u64,
            })
            .collect();
        df!("event_type" => names, "total" => totals)?
    } else {
        let totals: Vec<f64> = rows.iter().map(|r| r.total.as_f64()).collect();
        df!("event_type" => names, "total" => totals)?
    };
    Ok(frame)
}
