//! Core data structures for storm event analysis.
//!
//! Defines the projected event record, its normalized form with USD
//! damage figures, the measures that can be aggregated, and the
//! aggregate rows and statistics produced by a run.

use crate::error::{Result, StormError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// One storm event as projected from the raw table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormEvent {
    pub id: String,
    pub event_type: String,
    pub fatalities: u64,
    pub injuries: u64,
    pub property_damage: f64,
    pub property_damage_exp: String,
    pub crop_damage: f64,
    pub crop_damage_exp: String,
}

/// A storm event with its damage figures converted to USD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedEvent {
    pub event: StormEvent,
    pub property_damage_usd: f64,
    pub crop_damage_usd: f64,
    pub total_damage_usd: f64,
    pub total_affected: u64,
}

impl NormalizedEvent {
    /// Fails when fatalities plus injuries does not fit in a `u64`
    pub fn new(event: StormEvent, property_damage_usd: f64, crop_damage_usd: f64) -> Result<Self> {
        let total_affected = event
            .fatalities
            .checked_add(event.injuries)
            .ok_or_else(|| StormError::CountOverflow {
                measure: Measure::TotalAffected.slug().to_string(),
                key: event.id.clone(),
            })?;
        Ok(Self {
            event,
            property_damage_usd,
            crop_damage_usd,
            total_damage_usd: property_damage_usd + crop_damage_usd,
            total_affected,
        })
    }

    pub fn event_type(&self) -> &str {
        &self.event.event_type
    }
}

/// Numeric field selected as the summation target of an aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Fatalities,
    Injuries,
    TotalAffected,
    PropertyDamageUsd,
    CropDamageUsd,
    TotalDamageUsd,
}

impl Measure {
    /// Every measure, in report order
    pub const ALL: [Measure; 6] = [
        Measure::Fatalities,
        Measure::Injuries,
        Measure::TotalAffected,
        Measure::PropertyDamageUsd,
        Measure::CropDamageUsd,
        Measure::TotalDamageUsd,
    ];

    /// Human readable title used in reports and charts
    pub fn label(&self) -> &'static str {
        match self {
            Measure::Fatalities => "Fatalities",
            Measure::Injuries => "Injuries",
            Measure::TotalAffected => "People affected (fatalities + injuries)",
            Measure::PropertyDamageUsd => "Property damage (USD)",
            Measure::CropDamageUsd => "Crop damage (USD)",
            Measure::TotalDamageUsd => "Total damage (USD)",
        }
    }

    /// Stable identifier used for output file names
    pub fn slug(&self) -> &'static str {
        match self {
            Measure::Fatalities => "fatalities",
            Measure::Injuries => "injuries",
            Measure::TotalAffected => "total_affected",
            Measure::PropertyDamageUsd => "property_damage_usd",
            Measure::CropDamageUsd => "crop_damage_usd",
            Measure::TotalDamageUsd => "total_damage_usd",
        }
    }

    /// Whether the measure is a head count summed with integer arithmetic
    pub fn is_count(&self) -> bool {
        matches!(
            self,
            Measure::Fatalities | Measure::Injuries | Measure::TotalAffected
        )
    }

    /// Additive identity for this measure
    pub fn zero(&self) -> MeasureTotal {
        if self.is_count() {
            MeasureTotal::Count(0)
        } else {
            MeasureTotal::Usd(0.0)
        }
    }

    /// Extract this measure from a normalized event
    pub fn value_of(&self, event: &NormalizedEvent) -> MeasureTotal {
        match self {
            Measure::Fatalities => MeasureTotal::Count(event.event.fatalities),
            Measure::Injuries => MeasureTotal::Count(event.event.injuries),
            Measure::TotalAffected => MeasureTotal::Count(event.total_affected),
            Measure::PropertyDamageUsd => MeasureTotal::Usd(event.property_damage_usd),
            Measure::CropDamageUsd => MeasureTotal::Usd(event.crop_damage_usd),
            Measure::TotalDamageUsd => MeasureTotal::Usd(event.total_damage_usd),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Summed value of a measure: exact for head counts, floating point for USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasureTotal {
    Count(u64),
    Usd(f64),
}

impl MeasureTotal {
    pub fn as_f64(&self) -> f64 {
        match *self {
            MeasureTotal::Count(n) => n as f64,
            MeasureTotal::Usd(v) => v,
        }
    }

    pub fn is_positive(&self) -> bool {
        match *self {
            MeasureTotal::Count(n) => n > 0,
            MeasureTotal::Usd(v) => v > 0.0,
        }
    }

    /// Accumulate another value of the same kind; `None` when a count overflows
    pub fn checked_add(self, other: MeasureTotal) -> Option<MeasureTotal> {
        match (self, other) {
            (MeasureTotal::Count(a), MeasureTotal::Count(b)) => {
                a.checked_add(b).map(MeasureTotal::Count)
            }
            (a, b) => Some(MeasureTotal::Usd(a.as_f64() + b.as_f64())),
        }
    }

    /// Ordering that places larger totals first
    pub fn cmp_descending(&self, other: &MeasureTotal) -> Ordering {
        match (self, other) {
            (MeasureTotal::Count(a), MeasureTotal::Count(b)) => b.cmp(a),
            (a, b) => b.as_f64().total_cmp(&a.as_f64()),
        }
    }
}

impl fmt::Display for MeasureTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureTotal::Count(n) => write!(f, "{}", n),
            MeasureTotal::Usd(v) => write!(f, "{:.2}", v),
        }
    }
}

/// One (event type, summed measure) pair in a sorted result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub event_type: String,
    pub total: MeasureTotal,
}

/// Ranking of event types for a single measure
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub measure: Measure,
    pub rows: Vec<AggregateRow>,
}

/// The six rankings produced for every run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImpactSummary {
    pub rankings: Vec<Ranking>,
}

impl ImpactSummary {
    pub fn ranking(&self, measure: Measure) -> Option<&Ranking> {
        self.rankings.iter().find(|r| r.measure == measure)
    }
}

/// Processing statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub dataset_path: PathBuf,
    pub rows_loaded: usize,
    pub events_normalized: usize,
    pub events_skipped: usize,
    pub distinct_event_types: usize,
    pub processing_time_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(fatalities: u64, injuries: u64) -> StormEvent {
        StormEvent {
            id: "42".to_string(),
            event_type: "HEAT".to_string(),
            fatalities,
            injuries,
            property_damage: 0.0,
            property_damage_exp: String::new(),
            crop_damage: 0.0,
            crop_damage_exp: String::new(),
        }
    }

    #[test]
    fn test_total_affected_overflow_within_record() {
        match NormalizedEvent::new(event(u64::MAX, 1), 0.0, 0.0) {
            Err(StormError::CountOverflow { measure, key }) => {
                assert_eq!(measure, "total_affected");
                assert_eq!(key, "42");
            }
            other => panic!("Expected CountOverflow, got {:?}", other),
        }

        let largest = NormalizedEvent::new(event(u64::MAX - 1, 1), 0.0, 0.0).unwrap();
        assert_eq!(largest.total_affected, u64::MAX);
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(
            MeasureTotal::Count(2).checked_add(MeasureTotal::Count(3)),
            Some(MeasureTotal::Count(5))
        );
        assert_eq!(
            MeasureTotal::Count(u64::MAX).checked_add(MeasureTotal::Count(1)),
            None
        );
        assert_eq!(
            MeasureTotal::Usd(1.5).checked_add(MeasureTotal::Usd(2.0)),
            Some(MeasureTotal::Usd(3.5))
        );
    }
}
