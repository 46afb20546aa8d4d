//! Damage exponent decoding.
//!
//! The raw dataset stores damage as a magnitude plus a one character
//! exponent code. [`MultiplierTable`] decodes those codes and
//! [`Normalizer`] applies it to whole events, producing USD figures.
//! Codes outside the table are never guessed: they either abort the run
//! or drop the record, depending on [`UnknownCodePolicy`].

use crate::config::UnknownCodePolicy;
use crate::error::{Result, StormError};
use crate::models::{NormalizedEvent, StormEvent};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

static STANDARD_TABLE: LazyLock<MultiplierTable> = LazyLock::new(|| {
    let mut entries: Vec<(&str, u64)> = vec![
        ("-", 0),
        ("?", 0),
        ("", 0),
        ("+", 1),
        ("H", 100),
        ("h", 100),
        ("K", 1_000),
        ("k", 1_000),
        ("M", 1_000_000),
        ("m", 1_000_000),
        ("B", 1_000_000_000),
        ("b", 1_000_000_000),
    ];
    // Digit codes 0-8 all decode to 10; 9 has no entry.
    const DIGITS: [&str; 9] = ["0", "1", "2", "3", "4", "5", "6", "7", "8"];
    entries.extend(DIGITS.iter().map(|d| (*d, 10)));
    MultiplierTable::from_entries(entries)
});

/// Immutable mapping from exponent code to integer multiplier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplierTable {
    entries: HashMap<String, u64>,
}

impl MultiplierTable {
    /// The storm database code table, built once per process
    pub fn standard() -> &'static MultiplierTable {
        &STANDARD_TABLE
    }

    /// Build a table from explicit entries. The blank code is keyed by `""`.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(code, multiplier)| (code.into(), multiplier))
                .collect(),
        }
    }

    /// Decode an exponent code. Empty and single-space codes are the blank case.
    pub fn multiplier(&self, code: &str) -> Result<u64> {
        let key = if code == " " { "" } else { code };
        self.entries
            .get(key)
            .copied()
            .ok_or_else(|| StormError::UnknownExponentCode {
                code: code.to_string(),
            })
    }

    /// `magnitude × multiplier(code)`, unrounded
    pub fn damage_usd(&self, magnitude: f64, code: &str) -> Result<f64> {
        let multiplier = self.multiplier(code)?;
        Ok(magnitude * multiplier as f64)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of normalizing a batch of events
#[derive(Debug, Default)]
pub struct NormalizationOutcome {
    pub events: Vec<NormalizedEvent>,
    /// Records dropped under [`UnknownCodePolicy::Skip`]
    pub skipped: usize,
}

/// Converts projected events into USD figures with an injected code table
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    table: &'a MultiplierTable,
    policy: UnknownCodePolicy,
}

impl Default for Normalizer<'static> {
    fn default() -> Self {
        Self::new(MultiplierTable::standard(), UnknownCodePolicy::Abort)
    }
}

impl<'a> Normalizer<'a> {
    pub fn new(table: &'a MultiplierTable, policy: UnknownCodePolicy) -> Self {
        Self { table, policy }
    }

    pub fn policy(&self) -> UnknownCodePolicy {
        self.policy
    }

    /// Normalize a single event, failing on any unknown exponent code
    pub fn normalize(&self, event: StormEvent) -> Result<NormalizedEvent> {
        let property_usd = self
            .table
            .damage_usd(event.property_damage, &event.property_damage_exp)?;
        let crop_usd = self
            .table
            .damage_usd(event.crop_damage, &event.crop_damage_exp)?;
        NormalizedEvent::new(event, property_usd, crop_usd)
    }

    /// Normalize every event, applying the configured unknown-code policy
    pub fn normalize_all(&self, events: Vec<StormEvent>) -> Result<NormalizationOutcome> {
        let mut outcome = NormalizationOutcome {
            events: Vec::with_capacity(events.len()),
            skipped: 0,
        };

        for event in events {
            let id = event.id.clone();
            match self.normalize(event) {
                Ok(normalized) => outcome.events.push(normalized),
                Err(StormError::UnknownExponentCode { code })
                    if self.policy == UnknownCodePolicy::Skip =>
                {
                    warn!(
                        "Skipping event {}: unknown damage exponent code '{}'",
                        id, code
                    );
                    outcome.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Normalized {} events ({} skipped)",
            outcome.events.len(),
            outcome.skipped
        );
        Ok(outcome)
    }
}
