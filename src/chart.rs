//! SVG bar charts of the leading event types for a measure.

use crate::constants::{USD_PER_BILLION, USD_PER_MILLION};
use crate::error::{Result, StormError};
use crate::models::{AggregateRow, Measure};
use plotters::prelude::*;
use std::path::Path;
use tracing::debug;

/// Pick a display scale so axis labels stay short
fn value_scale(measure: Measure, max: f64) -> (f64, &'static str) {
    if measure.is_count() {
        (1.0, "people")
    } else if max >= USD_PER_BILLION {
        (USD_PER_BILLION, "billions of USD")
    } else if max >= USD_PER_MILLION {
        (USD_PER_MILLION, "millions of USD")
    } else {
        (1.0, "USD")
    }
}

/// Render `rows` as a vertical bar chart at `path`
pub fn render_bar_chart(
    path: &Path,
    measure: Measure,
    rows: &[AggregateRow],
    size: (u32, u32),
) -> Result<()> {
    let chart_error = |e: &dyn std::fmt::Debug| StormError::Chart {
        path: path.to_path_buf(),
        reason: format!("{:?}", e),
    };

    let max = rows.iter().map(|r| r.total.as_f64()).fold(0.0, f64::max);
    let (scale, unit) = value_scale(measure, max);
    let labels: Vec<&str> = rows.iter().map(|r| r.event_type.as_str()).collect();
    let y_top = if max > 0.0 { max / scale * 1.1 } else { 1.0 };

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_error(&e))?;

    if rows.is_empty() {
        root.draw(&Text::new(
            format!("No event type has a positive {}", measure.slug()),
            (20, 20),
            ("sans-serif", 20),
        ))
        .map_err(|e| chart_error(&e))?;
        root.present().map_err(|e| chart_error(&e))?;
        return Ok(());
    }

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Event types ranked by {}", measure.label().to_lowercase()),
            ("sans-serif", 28),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..rows.len() as u32).into_segmented(), 0f64..y_top)
        .map_err(|e| chart_error(&e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Event type")
        .y_desc(unit)
        .x_labels(rows.len().max(1))
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(i) => labels
                .get(*i as usize)
                .map(|s| s.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(|e| chart_error(&e))?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.6).filled())
                .margin(8)
                .data(
                    rows.iter()
                        .enumerate()
                        .map(|(i, r)| (i as u32, r.total.as_f64() / scale)),
                ),
        )
        .map_err(|e| chart_error(&e))?;

    root.present().map_err(|e| chart_error(&e))?;
    debug!("Rendered {} chart to {}", measure.slug(), path.display());
    Ok(())
}
