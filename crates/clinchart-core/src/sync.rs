//! View synchronization: series projection and plot↔table selection.
//!
//! The synchronizer projects the store into one scatter series per
//! configured type (plus the Event marker series) and maps selection both
//! ways between plot points and table rows. It holds no widgets: the
//! rendering collaborator consumes `SeriesData`, `SelectionUpdate`, and
//! `ViewRanges` as plain data.
//!
//! Ordering requirement: call `refresh` after every store mutation and
//! before reacting to any selection event, otherwise a row can map to
//! zero points (stale series data) — never to wrong ones.

use chrono::NaiveDateTime;

use clinchart_model::{ChartConfig, EVENT_KIND, EVENT_SENTINEL_Y, Record};

use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: NaiveDateTime,
    pub y: f64,
}

/// One rendered series: the subset of records of one type.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub kind: String,
    pub points: Vec<PlotPoint>,
}

/// Identifies one point inside one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointRef {
    pub kind: String,
    pub point: usize,
}

/// Highlight/selection delta handed to the renderer. Previously
/// highlighted points are always cleared before new ones are set, which
/// is what keeps the two one-directional update paths from feeding back
/// into each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionUpdate {
    pub cleared: Vec<PointRef>,
    pub highlighted: Vec<PointRef>,
    pub rows: Vec<usize>,
}

/// Axis ranges for the default view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRanges {
    pub left: (f64, f64),
    pub right: (f64, f64),
    pub time: (NaiveDateTime, NaiveDateTime),
}

#[derive(Debug)]
pub struct ViewSynchronizer {
    series: Vec<SeriesData>,
    highlighted: Vec<PointRef>,
    /// Tolerance for matching a clicked y against value×coefficient.
    /// 0.0 reproduces exact float equality.
    match_tolerance: f64,
}

impl ViewSynchronizer {
    /// Create the series set once, empty; series are repopulated on every
    /// refresh, never recreated.
    pub fn new(config: &ChartConfig) -> Self {
        let series = config
            .plotted_kinds()
            .into_iter()
            .map(|kind| SeriesData {
                kind: kind.to_string(),
                points: Vec::new(),
            })
            .collect();
        Self {
            series,
            highlighted: Vec::new(),
            match_tolerance: 0.0,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.match_tolerance = tolerance;
        self
    }

    pub fn series(&self) -> &[SeriesData] {
        &self.series
    }

    pub fn series_for(&self, kind: &str) -> Option<&SeriesData> {
        self.series.iter().find(|s| s.kind == kind)
    }

    /// Repopulate every series wholesale from the current store contents.
    pub fn refresh(&mut self, store: &RecordStore, config: &ChartConfig) {
        for series in &mut self.series {
            series.points.clear();
            if series.kind == EVENT_KIND {
                // Events are markers on the sentinel line; blank-valued
                // event rows are not plotted.
                series.points.extend(
                    store
                        .records()
                        .iter()
                        .filter(|r| r.kind == EVENT_KIND && !r.value.trim().is_empty())
                        .map(|r| PlotPoint {
                            x: r.timestamp,
                            y: EVENT_SENTINEL_Y,
                        }),
                );
                continue;
            }

            let coefficient = config.coefficient(&series.kind);
            for record in store.records().iter().filter(|r| r.kind == series.kind) {
                match record.numeric_value() {
                    Some(value) => series.points.push(PlotPoint {
                        x: record.timestamp,
                        y: value * coefficient,
                    }),
                    None => tracing::warn!(
                        kind = %series.kind,
                        value = %record.value,
                        "non-numeric value skipped in series refresh"
                    ),
                }
            }
        }
        tracing::debug!(rows = store.len(), "series refreshed");
    }

    /// Plot → table: resolve clicked points to table rows.
    ///
    /// For each clicked point, records sharing its timestamp are scanned;
    /// a numeric row matches when value×coefficient equals the clicked y
    /// (within the configured tolerance), an event row matches the
    /// sentinel y. When several rows share the same (timestamp, value),
    /// the last one wins.
    pub fn points_clicked(
        &mut self,
        clicks: &[PointRef],
        store: &RecordStore,
        config: &ChartConfig,
    ) -> SelectionUpdate {
        let cleared = std::mem::take(&mut self.highlighted);
        let mut rows = Vec::new();

        for click in clicks {
            let Some(point) = self
                .series_for(&click.kind)
                .and_then(|s| s.points.get(click.point))
                .copied()
            else {
                continue;
            };

            let mut matched = None;
            for (row, record) in store.records().iter().enumerate() {
                if record.timestamp != point.x {
                    continue;
                }
                match record.numeric_value() {
                    Some(value) => {
                        let plotted = value * config.coefficient(&record.kind);
                        if (plotted - point.y).abs() <= self.match_tolerance {
                            matched = Some(row);
                        }
                    }
                    None => {
                        if point.y == EVENT_SENTINEL_Y {
                            matched = Some(row);
                        }
                    }
                }
            }
            if let Some(row) = matched {
                rows.push(row);
            }
            self.highlighted.push(click.clone());
        }

        SelectionUpdate {
            cleared,
            highlighted: self.highlighted.clone(),
            rows,
        }
    }

    /// Table → plot: highlight the points behind the selected rows.
    ///
    /// Every point of the row's series whose x equals the row's timestamp
    /// is highlighted. Zero matches are possible when the series has not
    /// been refreshed since the last mutation; see the module note.
    pub fn rows_selected(&mut self, rows: &[usize], store: &RecordStore) -> SelectionUpdate {
        let cleared = std::mem::take(&mut self.highlighted);

        for &row in rows {
            let Some(record) = store.get(row) else {
                continue;
            };
            if let Some(series) = self.series_for(&record.kind) {
                let hits: Vec<PointRef> = series
                    .points
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.x == record.timestamp)
                    .map(|(i, _)| PointRef {
                        kind: record.kind.clone(),
                        point: i,
                    })
                    .collect();
                self.highlighted.extend(hits);
            }
        }

        SelectionUpdate {
            cleared,
            highlighted: self.highlighted.clone(),
            rows: rows.to_vec(),
        }
    }

    /// Reset ranges: fixed configured bounds for the value axes, the
    /// store's [min, max] for the time axis, and the configured fallback
    /// window when the store is empty.
    pub fn default_view(&self, store: &RecordStore, config: &ChartConfig) -> ViewRanges {
        let left = config.left_axis.range.unwrap_or((EVENT_SENTINEL_Y, 90.0));
        let right = config.right_axis.range.unwrap_or((0.0, 30_000.0));
        let time = match (
            store.records().first().map(|r| r.timestamp),
            store.records().last().map(|r| r.timestamp),
        ) {
            (Some(min), Some(max)) => (min, max),
            _ => config.fallback_window,
        };
        ViewRanges { left, right, time }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::parse_timestamp;

    fn config() -> ChartConfig {
        ChartConfig::builtin()
    }

    fn record(date: &str, kind: &str, value: &str) -> Record {
        Record::new(parse_timestamp(date).unwrap(), kind, value, "")
    }

    fn loaded_store() -> RecordStore {
        let mut store = RecordStore::new();
        store.load(vec![
            record("01/01/2021 08:00", "Vtop", "45"),
            record("01/01/2021 08:00", "Infusion", "100"),
            record("01/01/2021 09:00", "Event", "Surgery"),
            record("01/01/2021 10:00", "Vtop", "50"),
        ]);
        store
    }

    #[test]
    fn series_are_created_once_and_repopulated() {
        let config = config();
        let mut sync = ViewSynchronizer::new(&config);
        assert!(sync.series().iter().all(|s| s.points.is_empty()));
        let count = sync.series().len();

        let store = loaded_store();
        sync.refresh(&store, &config);
        assert_eq!(sync.series().len(), count);
        assert_eq!(sync.series_for("Vtop").unwrap().points.len(), 2);
    }

    #[test]
    fn coefficient_is_applied_to_plotted_y() {
        let config = config();
        let mut sync = ViewSynchronizer::new(&config);
        sync.refresh(&loaded_store(), &config);

        let infusion = sync.series_for("Infusion").unwrap();
        assert_eq!(infusion.points[0].y, 1200.0);
    }

    #[test]
    fn event_series_uses_the_sentinel_y() {
        let config = config();
        let mut sync = ViewSynchronizer::new(&config);
        let mut store = loaded_store();
        store.insert(vec![record("01/01/2021 11:00", "Event", "")]);
        sync.refresh(&store, &config);

        let events = sync.series_for(EVENT_KIND).unwrap();
        // The blank-valued event row is not plotted.
        assert_eq!(events.points.len(), 1);
        assert_eq!(events.points[0].y, EVENT_SENTINEL_Y);
    }

    #[test]
    fn clicking_an_event_point_selects_its_row() {
        let config = config();
        let store = loaded_store();
        let mut sync = ViewSynchronizer::new(&config);
        sync.refresh(&store, &config);

        let update = sync.points_clicked(
            &[PointRef {
                kind: EVENT_KIND.to_string(),
                point: 0,
            }],
            &store,
            &config,
        );
        assert_eq!(update.rows, vec![2]);
        assert_eq!(update.highlighted.len(), 1);
    }

    #[test]
    fn clicking_a_measurement_point_matches_value_times_coefficient() {
        let config = config();
        let store = loaded_store();
        let mut sync = ViewSynchronizer::new(&config);
        sync.refresh(&store, &config);

        let update = sync.points_clicked(
            &[PointRef {
                kind: "Infusion".to_string(),
                point: 0,
            }],
            &store,
            &config,
        );
        assert_eq!(update.rows, vec![1]);
    }

    #[test]
    fn last_matching_row_wins_on_identical_pairs() {
        let config = config();
        let mut store = RecordStore::new();
        store.load(vec![
            record("01/01/2021 08:00", "Vtop", "45"),
            record("01/01/2021 08:00", "Vtop", "45"),
        ]);
        let mut sync = ViewSynchronizer::new(&config);
        sync.refresh(&store, &config);

        let update = sync.points_clicked(
            &[PointRef {
                kind: "Vtop".to_string(),
                point: 0,
            }],
            &store,
            &config,
        );
        assert_eq!(update.rows, vec![1]);
    }

    #[test]
    fn selecting_a_row_highlights_its_points_and_clears_previous() {
        let config = config();
        let store = loaded_store();
        let mut sync = ViewSynchronizer::new(&config);
        sync.refresh(&store, &config);

        let first = sync.rows_selected(&[0], &store);
        assert_eq!(
            first.highlighted,
            vec![PointRef {
                kind: "Vtop".to_string(),
                point: 0,
            }]
        );
        assert!(first.cleared.is_empty());

        let second = sync.rows_selected(&[2], &store);
        assert_eq!(second.cleared, first.highlighted);
        assert_eq!(
            second.highlighted,
            vec![PointRef {
                kind: EVENT_KIND.to_string(),
                point: 0,
            }]
        );
    }

    #[test]
    fn selection_round_trips_between_plot_and_table() {
        // Clicking the event point selects its row; selecting that row
        // re-highlights exactly that point.
        let config = config();
        let store = loaded_store();
        let mut sync = ViewSynchronizer::new(&config);
        sync.refresh(&store, &config);

        let click = PointRef {
            kind: EVENT_KIND.to_string(),
            point: 0,
        };
        let from_plot = sync.points_clicked(&[click.clone()], &store, &config);
        let from_table = sync.rows_selected(&from_plot.rows, &store);
        assert_eq!(from_table.highlighted, vec![click]);
    }

    #[test]
    fn stale_series_maps_a_row_to_zero_points() {
        let config = config();
        let mut store = loaded_store();
        let mut sync = ViewSynchronizer::new(&config);
        sync.refresh(&store, &config);

        store.insert(vec![record("02/01/2021 08:00", "Vtop", "60")]);
        // No refresh: the new row exists in the store but not the series.
        let update = sync.rows_selected(&[4], &store);
        assert!(update.highlighted.is_empty());
    }

    #[test]
    fn default_view_tracks_the_store_time_span() {
        let config = config();
        let store = loaded_store();
        let sync = ViewSynchronizer::new(&config);

        let ranges = sync.default_view(&store, &config);
        assert_eq!(ranges.left, (-1.0, 90.0));
        assert_eq!(ranges.right, (0.0, 30_000.0));
        assert_eq!(ranges.time.0, parse_timestamp("01/01/2021 08:00").unwrap());
        assert_eq!(ranges.time.1, parse_timestamp("01/01/2021 10:00").unwrap());

        let empty = RecordStore::new();
        let ranges = sync.default_view(&empty, &config);
        assert_eq!(ranges.time, config.fallback_window);
    }
}
