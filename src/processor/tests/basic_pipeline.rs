//! Basic pipeline tests

use super::{SCENARIO_ROWS, write_bz2_dataset, write_plain_dataset};
use crate::config::AnalysisConfig;
use crate::models::{AggregateRow, Measure, MeasureTotal};
use crate::normalizer::MultiplierTable;
use crate::processor::StormAnalysis;
use tempfile::TempDir;

fn row(event_type: &str, total: MeasureTotal) -> AggregateRow {
    AggregateRow {
        event_type: event_type.to_string(),
        total,
    }
}

#[tokio::test]
async fn test_compressed_dataset_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let data_file = write_bz2_dataset(temp_dir.path(), SCENARIO_ROWS);

    let config = AnalysisConfig::default()
        .with_data_file(data_file.clone())
        .with_cache_dir(temp_dir.path().join("cache"));
    let analysis = StormAnalysis::new(config).unwrap();

    let outcome = analysis.run().await.unwrap();

    assert_eq!(outcome.stats.dataset_path, data_file);
    assert_eq!(outcome.stats.rows_loaded, 3);
    assert_eq!(outcome.stats.events_normalized, 3);
    assert_eq!(outcome.stats.events_skipped, 0);
    assert_eq!(outcome.stats.distinct_event_types, 2);
    assert!(outcome.written.is_empty());

    let summary = &outcome.summary;
    assert_eq!(
        summary.ranking(Measure::Fatalities).unwrap().rows,
        vec![row("TORNADO", MeasureTotal::Count(8))]
    );
    assert_eq!(
        summary.ranking(Measure::PropertyDamageUsd).unwrap().rows,
        vec![row("TORNADO", MeasureTotal::Usd(1_002_500.0))]
    );
    assert_eq!(
        summary.ranking(Measure::CropDamageUsd).unwrap().rows,
        vec![row("FLOOD", MeasureTotal::Usd(4_000_000_000.0))]
    );
}

#[tokio::test]
async fn test_plain_dataset_with_reports() {
    let temp_dir = TempDir::new().unwrap();
    let data_file = write_plain_dataset(temp_dir.path(), SCENARIO_ROWS);
    let output_dir = temp_dir.path().join("report");

    let config = AnalysisConfig::default()
        .with_data_file(data_file)
        .with_output_dir(output_dir.clone())
        .with_top_n(3);
    let outcome = StormAnalysis::new(config).unwrap().run().await.unwrap();

    // six CSV files, six charts and the JSON summary
    assert_eq!(outcome.written.len(), 13);
    for measure in Measure::ALL {
        assert!(output_dir.join(format!("{}.csv", measure.slug())).exists());
        assert!(output_dir.join(format!("{}.svg", measure.slug())).exists());
    }

    let csv = std::fs::read_to_string(output_dir.join("total_affected.csv")).unwrap();
    assert_eq!(csv.lines().collect::<Vec<_>>(), vec!["event_type,total", "TORNADO,18", "FLOOD,2"]);
}

#[tokio::test]
async fn test_cached_dataset_reused() {
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().join("cache");
    std::fs::create_dir_all(&cache_dir).unwrap();
    let cached = write_bz2_dataset(&cache_dir, SCENARIO_ROWS);

    let mut config = AnalysisConfig::default()
        .with_cache_dir(cache_dir)
        .with_url("http://127.0.0.1:9/never-contacted");
    config.file_name = cached.file_name().unwrap().to_string_lossy().into_owned();

    let outcome = StormAnalysis::new(config).unwrap().run().await.unwrap();
    assert_eq!(outcome.stats.dataset_path, cached);
    assert_eq!(outcome.stats.rows_loaded, 3);
}

#[tokio::test]
async fn test_injected_multiplier_table() {
    let temp_dir = TempDir::new().unwrap();
    let data_file = write_plain_dataset(temp_dir.path(), SCENARIO_ROWS);

    // Every code scales by 2
    let table = MultiplierTable::from_entries([("", 2u64), ("K", 2), ("M", 2), ("B", 2)]);
    let config = AnalysisConfig::default().with_data_file(data_file);
    let outcome = StormAnalysis::new(config)
        .unwrap()
        .with_multiplier_table(table)
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome
            .summary
            .ranking(Measure::TotalDamageUsd)
            .unwrap()
            .rows,
        vec![
            row("FLOOD", MeasureTotal::Usd(8.0)),
            row("TORNADO", MeasureTotal::Usd(7.0)),
        ]
    );
}
