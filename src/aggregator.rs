//! Group-by-event-type aggregation.
//!
//! Partitions normalized events by their exact event-type label, sums
//! one measure per group, drops groups whose sum is not positive and
//! sorts the rest in descending order. Groups with equal sums keep the
//! order in which their label was first seen, so results are
//! reproducible across runs.

use crate::error::{Result, StormError};
use crate::models::{AggregateRow, ImpactSummary, Measure, MeasureTotal, NormalizedEvent, Ranking};
use std::collections::HashMap;
use tracing::debug;

/// Sum `measure` per event type, keeping positive groups in descending order.
///
/// Fails with [`StormError::CountOverflow`] when a head-count sum exceeds `u64`.
pub fn aggregate(events: &[NormalizedEvent], measure: Measure) -> Result<Vec<AggregateRow>> {
    // Slot per label in first-encounter order
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, MeasureTotal)> = Vec::new();

    for event in events {
        let key = event.event_type();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, measure.zero()));
            groups.len() - 1
        });
        groups[slot].1 = groups[slot]
            .1
            .checked_add(measure.value_of(event))
            .ok_or_else(|| StormError::CountOverflow {
                measure: measure.slug().to_string(),
                key: key.to_string(),
            })?;
    }

    let group_count = groups.len();
    let mut rows: Vec<AggregateRow> = groups
        .into_iter()
        .filter(|(_, total)| total.is_positive())
        .map(|(event_type, total)| AggregateRow {
            event_type: event_type.to_string(),
            total,
        })
        .collect();

    // sort_by is stable: ties stay in first-encounter order
    rows.sort_by(|a, b| a.total.cmp_descending(&b.total));

    debug!(
        "Aggregated {} by event type: {} groups, {} with positive totals",
        measure.slug(),
        group_count,
        rows.len()
    );
    Ok(rows)
}

/// Run every measure in [`Measure::ALL`]
pub fn aggregate_all(events: &[NormalizedEvent]) -> Result<ImpactSummary> {
    let rankings = Measure::ALL
        .iter()
        .map(|&measure| {
            Ok(Ranking {
                measure,
                rows: aggregate(events, measure)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ImpactSummary { rankings })
}

/// Leading `n` rows of a sorted result
pub fn top_n(rows: &[AggregateRow], n: usize) -> &[AggregateRow] {
    &rows[..n.min(rows.len())]
}

/// Number of distinct event-type labels in the input
pub fn distinct_event_types(events: &[NormalizedEvent]) -> usize {
    events
        .iter()
        .map(|e| e.event_type())
        .collect::<std::collections::HashSet<_>>()
        .len()
}
