use criterion::{Criterion, black_box, criterion_group, criterion_main};
use storm_impact::{Measure, Normalizer, StormEvent, aggregate, aggregate_all};

const EVENT_TYPES: &[&str] = &[
    "TORNADO",
    "TSTM WIND",
    "HAIL",
    "FLASH FLOOD",
    "FLOOD",
    "EXCESSIVE HEAT",
    "HEAT",
    "LIGHTNING",
    "WINTER STORM",
    "HIGH WIND",
];
const CODES: &[&str] = &["", "K", "M", "B", "0", "+", "h"];

fn synthetic_events(count: usize) -> Vec<storm_impact::NormalizedEvent> {
    let events = (0..count)
        .map(|i| StormEvent {
            id: i.to_string(),
            event_type: EVENT_TYPES[i % EVENT_TYPES.len()].to_string(),
            fatalities: (i % 7) as u64,
            injuries: (i % 13) as u64,
            property_damage: (i % 100) as f64 * 1.5,
            property_damage_exp: CODES[i % CODES.len()].to_string(),
            crop_damage: (i % 50) as f64,
            crop_damage_exp: CODES[(i / 3) % CODES.len()].to_string(),
        })
        .collect();
    Normalizer::default()
        .normalize_all(events)
        .map(|outcome| outcome.events)
        .unwrap_or_default()
}

fn bench_aggregate(c: &mut Criterion) {
    let events = synthetic_events(100_000);

    c.bench_function("aggregate_total_damage_100k", |b| {
        b.iter(|| aggregate(black_box(&events), Measure::TotalDamageUsd))
    });

    c.bench_function("aggregate_all_100k", |b| {
        b.iter(|| aggregate_all(black_box(&events)))
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
