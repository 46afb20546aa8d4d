//! Application constants for the storm impact analyzer
//!
//! Dataset location, field names and presentation defaults used
//! throughout the pipeline.

// =============================================================================
// Dataset Location
// =============================================================================

/// Public copy of the NOAA storm event database used by the analysis
pub const DEFAULT_DATASET_URL: &str =
    "https://d396qusza40orc.cloudfront.net/repdata%2Fdata%2FStormData.csv.bz2";

/// File name used for the cached download
pub const DEFAULT_DATASET_FILE: &str = "repdata-data-StormData.csv.bz2";

/// Directory name created under the user cache directory
pub const CACHE_DIR_NAME: &str = "storm-impact";

/// Fallback cache directory when no user cache directory exists
pub const FALLBACK_CACHE_DIR: &str = ".storm-cache";

/// Suffix for in-flight downloads, renamed into place on completion
pub const PARTIAL_DOWNLOAD_SUFFIX: &str = ".part";

/// Suffix of the sibling directory reports are staged in before being moved into place
pub const STAGING_DIR_SUFFIX: &str = ".partial";

/// Leading bytes of every bzip2 stream
pub const BZIP2_MAGIC: &[u8] = b"BZh";

// =============================================================================
// Dataset Fields
// =============================================================================

/// Column names in the raw storm event table
pub mod fields {
    pub const REFNUM: &str = "REFNUM";
    pub const EVTYPE: &str = "EVTYPE";
    pub const FATALITIES: &str = "FATALITIES";
    pub const INJURIES: &str = "INJURIES";
    pub const PROPDMG: &str = "PROPDMG";
    pub const PROPDMGEXP: &str = "PROPDMGEXP";
    pub const CROPDMG: &str = "CROPDMG";
    pub const CROPDMGEXP: &str = "CROPDMGEXP";

    /// Fields retained by projection, in the order they are checked
    pub const REQUIRED: &[&str] = &[
        REFNUM, EVTYPE, FATALITIES, INJURIES, PROPDMG, PROPDMGEXP, CROPDMG, CROPDMGEXP,
    ];
}

// =============================================================================
// Presentation Defaults
// =============================================================================

/// Number of event types shown per ranking
pub const DEFAULT_TOP_N: usize = 5;

/// Default SVG chart dimensions in pixels
pub const DEFAULT_CHART_WIDTH: u32 = 1024;
pub const DEFAULT_CHART_HEIGHT: u32 = 768;

/// Name of the machine-readable summary written to the output directory
pub const SUMMARY_FILE_NAME: &str = "summary.json";

pub const USD_PER_BILLION: f64 = 1_000_000_000.0;
pub const USD_PER_MILLION: f64 = 1_000_000.0;
