//! Storm Impact Library
//!
//! Ranks NOAA storm event types by their impact on population health
//! and by the economic damage they cause.
//!
//! This library provides tools for:
//! - Downloading and caching the bzip2-compressed storm event database
//! - Projecting the raw table onto the eight fields the analysis uses
//! - Decoding damage exponent codes into USD amounts
//! - Summing fatalities, injuries and damage per event type
//! - Reporting the rankings as terminal tables, CSV, JSON and SVG charts
//!
//! Event-type labels are grouped by exact string equality. The source
//! data contains near-duplicate labels (for example `HEAT` and
//! `EXCESSIVE HEAT`); they are reported as separate groups.

pub mod aggregator;
pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod models;
pub mod normalizer;
pub mod processor;
pub mod projector;
pub mod report;

pub use aggregator::{aggregate, aggregate_all, top_n};
pub use config::{AnalysisConfig, UnknownCodePolicy};
pub use error::{Result, StormError};
pub use models::{AggregateRow, ImpactSummary, Measure, MeasureTotal, NormalizedEvent, StormEvent};
pub use normalizer::{MultiplierTable, Normalizer};
pub use processor::{AnalysisOutcome, StormAnalysis};
