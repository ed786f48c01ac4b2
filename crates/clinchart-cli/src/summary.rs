//! Human-readable table output for the terminal.

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use clinchart_core::{RecordStore, ViewRanges, ViewSynchronizer, format_timestamp};
use clinchart_model::{ChartConfig, Field};

/// Render the record store as the four-column table, prefixed with the
/// row positions used by `remove` and `edit`.
pub fn records_table(store: &RecordStore) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        std::iter::once("#".to_string())
            .chain(Field::ALL.iter().map(|f| f.heading().to_string())),
    );
    for (row, record) in store.records().iter().enumerate() {
        table.add_row(vec![
            row.to_string(),
            format_timestamp(record.timestamp),
            record.kind.clone(),
            record.value.clone(),
            record.comment.clone(),
        ]);
    }
    table
}

/// Render the plotted series summary: one line per series with its point
/// count, axis, and coefficient.
pub fn series_table(sync: &ViewSynchronizer, config: &ChartConfig) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["SERIES", "POINTS", "AXIS", "COEFFICIENT"]);
    for series in sync.series() {
        let axis = config
            .capability(&series.kind)
            .map_or("left (sentinel)", |s| match s.axis {
                clinchart_model::AxisSide::Left => "left",
                clinchart_model::AxisSide::Right => "right",
            });
        table.add_row(vec![
            series.kind.clone(),
            series.points.len().to_string(),
            axis.to_string(),
            config.coefficient(&series.kind).to_string(),
        ]);
    }
    table
}

pub fn print_view_ranges(ranges: &ViewRanges) {
    println!(
        "view: left [{}, {}]  right [{}, {}]  time [{} .. {}]",
        ranges.left.0,
        ranges.left.1,
        ranges.right.0,
        ranges.right.1,
        format_timestamp(ranges.time.0),
        format_timestamp(ranges.time.1),
    );
}
