//! Error handling for storm event analysis.
//!
//! Provides error types with context for dataset retrieval, table
//! parsing, field projection and damage normalization failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StormError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Dataset not found at path: {path}")]
    DatasetNotFound { path: PathBuf },

    #[error("Could not load dataset from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Required field '{field}' is missing from the dataset header")]
    MissingField { field: String },

    #[error("Invalid value '{value}' in field '{field}' at row {row}")]
    InvalidValue {
        field: String,
        row: usize,
        value: String,
    },

    #[error("Unknown damage exponent code: '{code}'")]
    UnknownExponentCode { code: String },

    #[error("Head count overflow summing {measure} for '{key}'")]
    CountOverflow { measure: String, key: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Chart rendering failed for {path}: {reason}")]
    Chart { path: PathBuf, reason: String },

    #[error("Background task failed: {reason}")]
    TaskFailed { reason: String },

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

impl StormError {
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StormError::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        StormError::Configuration {
            message: message.into(),
        }
    }

    pub fn interrupted(reason: impl Into<String>) -> Self {
        StormError::Interrupted {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StormError>;
