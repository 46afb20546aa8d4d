//! Projection of the raw storm table onto the analysis fields.
//!
//! Keeps exactly the eight columns the analysis needs, decodes the
//! categorical columns as plain text and parses the numeric ones. Any
//! other column is ignored.

use crate::constants::fields;
use crate::error::{Result, StormError};
use crate::models::StormEvent;
use polars::prelude::*;
use tracing::debug;

/// Convert a raw table into storm events
pub fn project(frame: &DataFrame) -> Result<Vec<StormEvent>> {
    for field in fields::REQUIRED {
        if frame.get_column_index(field).is_none() {
            return Err(StormError::MissingField {
                field: field.to_string(),
            });
        }
    }

    let ids = text_column(frame, fields::REFNUM)?;
    let event_types = text_column(frame, fields::EVTYPE)?;
    let fatalities = count_column(frame, fields::FATALITIES)?;
    let injuries = count_column(frame, fields::INJURIES)?;
    let property_damage = amount_column(frame, fields::PROPDMG)?;
    let property_exp = text_column(frame, fields::PROPDMGEXP)?;
    let crop_damage = amount_column(frame, fields::CROPDMG)?;
    let crop_exp = text_column(frame, fields::CROPDMGEXP)?;

    let mut events = Vec::with_capacity(frame.height());
    for row in 0..frame.height() {
        events.push(StormEvent {
            id: ids[row].clone(),
            event_type: event_types[row].clone(),
            fatalities: fatalities[row],
            injuries: injuries[row],
            property_damage: property_damage[row],
            property_damage_exp: property_exp[row].clone(),
            crop_damage: crop_damage[row],
            crop_damage_exp: crop_exp[row].clone(),
        });
    }

    debug!("Projected {} storm events", events.len());
    Ok(events)
}

/// Categorical column as text; null cells decode to the empty string
fn text_column(frame: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = frame
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.unwrap_or_default().to_string())
        .collect())
}

/// Non-negative finite decimal column
fn amount_column(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let raw = frame
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let raw = raw.str()?;

    raw.into_iter()
        .enumerate()
        .map(|(row, value)| parse_amount(name, row, value))
        .collect()
}

/// Head-count column; the source writes counts as decimals such as `3.00`
fn count_column(frame: &DataFrame, name: &str) -> Result<Vec<u64>> {
    amount_column(frame, name)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            // u64::MAX as f64 rounds up to 2^64, which does not fit
            if value.fract() == 0.0 && value < u64::MAX as f64 {
                Ok(value as u64)
            } else {
                Err(invalid(name, row, &value.to_string()))
            }
        })
        .collect()
}

fn parse_amount(field: &str, row: usize, value: Option<&str>) -> Result<f64> {
    let text = value.ok_or_else(|| invalid(field, row, "<missing>"))?;
    match text.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(invalid(field, row, text)),
    }
}

fn invalid(field: &str, row: usize, value: &str) -> StormError {
    StormError::InvalidValue {
        field: field.to_string(),
        row,
        value: value.to_string(),
    }
}
