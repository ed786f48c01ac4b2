//! The type→capability table consumed read-only by the core.
//!
//! Declares per-series plot styling, axis placement, value coefficients,
//! field validity ranges, repeat-multiplier choices, and the event-kind
//! enumeration. Loaded from a JSON configuration file; `ChartConfig::builtin`
//! provides the stock anticoagulation-chart table so the tool works without
//! one.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Series tag of the marker series plotted at the sentinel y.
pub const EVENT_KIND: &str = "Event";

/// Fixed y-coordinate for event markers: events are markers, not
/// measurements, so they sit on a sentinel line below the data.
pub const EVENT_SENTINEL_Y: f64 = -1.0;

/// Which value axis a series is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    Left,
    Right,
}

/// Marker styling handed through to the plot renderer untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    pub color: String,
    pub symbol: String,
}

/// Input rule for the form field that feeds a series.
///
/// Tagged union over the value shape: numeric fields carry their own
/// range and unit conversion, text fields pass through as-is. Per-type
/// dispatch happens by looking this up in the capability table, not by
/// string comparisons scattered through the code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum ValueRule {
    Numeric {
        min: f64,
        max: f64,
        /// Multiplier applied to the entered number before range-checking
        /// and storage (e.g. a dose entered in ml stored in ME).
        #[serde(default = "default_factor")]
        input_factor: f64,
    },
    Text,
}

fn default_factor() -> f64 {
    1.0
}

/// Capability entry for one record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub name: String,
    pub label: String,
    pub axis: AxisSide,
    /// Per-type multiplier converting a stored value into its plotted unit.
    #[serde(default = "default_factor")]
    pub coefficient: f64,
    pub style: PointStyle,
    pub rule: ValueRule,
    /// Allowed repeat multipliers for this field's form input. A submission
    /// with multiplier N expands into N records spaced 24h/N apart.
    #[serde(default)]
    pub repeat_choices: Vec<u32>,
}

/// Axis label/color declarations for the renderer, plus fixed value bounds
/// used by the default view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub label: String,
    pub color: String,
    /// Fixed (min, max) for value axes; the time axis has none.
    #[serde(default)]
    pub range: Option<(f64, f64)>,
}

/// Mapping of one legacy wide-schema column onto a record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyColumn {
    pub column: String,
    pub kind: String,
}

/// Legacy fixed-column file schema (one column per measurement kind),
/// supported for read-only import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacySchema {
    pub date_column: String,
    pub comment_column: String,
    pub event_column: String,
    pub value_columns: Vec<LegacyColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Field delimiter for delimited text files.
    pub delimiter: char,
    /// Measurement series in declaration (legend) order. The Event marker
    /// series is implicit and always present.
    pub series: Vec<SeriesSpec>,
    /// Enumeration offered by the event form field.
    pub event_kinds: Vec<String>,
    pub left_axis: AxisSpec,
    pub right_axis: AxisSpec,
    pub bottom_axis: AxisSpec,
    /// Time-axis window used when the store is empty.
    pub fallback_window: (NaiveDateTime, NaiveDateTime),
    #[serde(default)]
    pub legacy_schema: Option<LegacySchema>,
}

impl ChartConfig {
    /// Capability lookup by type name. `None` for unknown types and for
    /// the implicit Event series.
    pub fn capability(&self, kind: &str) -> Option<&SeriesSpec> {
        self.series.iter().find(|s| s.name == kind)
    }

    /// Plot coefficient for a type; types without a declared capability
    /// (including Event) plot their value unscaled.
    pub fn coefficient(&self, kind: &str) -> f64 {
        self.capability(kind).map_or(1.0, |s| s.coefficient)
    }

    /// All plotted series tags: the declared measurement kinds plus Event.
    pub fn plotted_kinds(&self) -> Vec<&str> {
        self.series
            .iter()
            .map(|s| s.name.as_str())
            .chain(std::iter::once(EVENT_KIND))
            .collect()
    }

    pub fn is_known_kind(&self, kind: &str) -> bool {
        kind == EVENT_KIND || self.capability(kind).is_some()
    }

    /// The stock anticoagulation-chart capability table.
    pub fn builtin() -> Self {
        let velocity = |name: &str, label: &str, color: &str, symbol: &str| SeriesSpec {
            name: name.to_string(),
            label: label.to_string(),
            axis: AxisSide::Left,
            coefficient: 1.0,
            style: PointStyle {
                color: color.to_string(),
                symbol: symbol.to_string(),
            },
            rule: ValueRule::Numeric {
                min: 0.0,
                max: 90.0,
                input_factor: 1.0,
            },
            repeat_choices: Vec::new(),
        };
        let dose = |name: &str, label: &str, color: &str, symbol: &str| SeriesSpec {
            name: name.to_string(),
            label: label.to_string(),
            axis: AxisSide::Right,
            coefficient: 1.0,
            style: PointStyle {
                color: color.to_string(),
                symbol: symbol.to_string(),
            },
            // Entered in ml, stored in ME.
            rule: ValueRule::Numeric {
                min: 0.0,
                max: 30_000.0,
                input_factor: 10_000.0,
            },
            repeat_choices: vec![1, 2, 3, 4, 6],
        };
        let infusion = |name: &str, label: &str, color: &str, symbol: &str| SeriesSpec {
            name: name.to_string(),
            label: label.to_string(),
            axis: AxisSide::Right,
            // Stored in ME/h, plotted as ME per 12h shift.
            coefficient: 12.0,
            style: PointStyle {
                color: color.to_string(),
                symbol: symbol.to_string(),
            },
            rule: ValueRule::Numeric {
                min: 0.0,
                max: 2_500.0,
                input_factor: 1.0,
            },
            repeat_choices: Vec::new(),
        };

        Self {
            delimiter: ';',
            series: vec![
                velocity("Vtop", "V top, mkm/s", "#1f77b4", "o"),
                velocity("Vtail", "V tail, mkm/s", "#17becf", "t"),
                dose("Enoxa", "Enoxa, ME", "#d62728", "s"),
                dose("RecEnoxa", "Recommended Enoxa, ME", "#ff9896", "s"),
                infusion("Infusion", "Infusion, ME/h", "#2ca02c", "d"),
                infusion("RecInfusion", "Recommended Infusion, ME/h", "#98df8a", "d"),
            ],
            event_kinds: vec![
                String::new(),
                "Surgery".to_string(),
                "Puncture".to_string(),
                "Bleeding".to_string(),
                "Transfusion".to_string(),
                "Other".to_string(),
            ],
            left_axis: AxisSpec {
                label: "Velocity, mkm/s".to_string(),
                color: "#1f77b4".to_string(),
                range: Some((-1.0, 90.0)),
            },
            right_axis: AxisSpec {
                label: "Dose, ME".to_string(),
                color: "#d62728".to_string(),
                range: Some((0.0, 30_000.0)),
            },
            bottom_axis: AxisSpec {
                label: "Date".to_string(),
                color: "#000000".to_string(),
                range: None,
            },
            fallback_window: (
                NaiveDate::from_ymd_opt(2021, 1, 1)
                    .expect("valid date")
                    .and_hms_opt(1, 10, 0)
                    .expect("valid time"),
                NaiveDate::from_ymd_opt(2021, 1, 1)
                    .expect("valid date")
                    .and_hms_opt(17, 41, 0)
                    .expect("valid time"),
            ),
            legacy_schema: Some(LegacySchema {
                date_column: "Date".to_string(),
                comment_column: "Comment".to_string(),
                event_column: "Event".to_string(),
                value_columns: vec![
                    LegacyColumn {
                        column: "Vtop".to_string(),
                        kind: "Vtop".to_string(),
                    },
                    LegacyColumn {
                        column: "Vtail".to_string(),
                        kind: "Vtail".to_string(),
                    },
                    LegacyColumn {
                        column: "Enoxa".to_string(),
                        kind: "Enoxa".to_string(),
                    },
                    LegacyColumn {
                        column: "RecEnoxa".to_string(),
                        kind: "RecEnoxa".to_string(),
                    },
                    LegacyColumn {
                        column: "Infusion".to_string(),
                        kind: "Infusion".to_string(),
                    },
                    LegacyColumn {
                        column: "RecInfusion".to_string(),
                        kind: "RecInfusion".to_string(),
                    },
                ],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_capability_lookup() {
        let config = ChartConfig::builtin();
        let enoxa = config.capability("Enoxa").expect("Enoxa capability");
        assert_eq!(enoxa.axis, AxisSide::Right);
        assert!(matches!(
            enoxa.rule,
            ValueRule::Numeric {
                input_factor, ..
            } if input_factor == 10_000.0
        ));
        assert!(config.capability("Event").is_none());
        assert!(config.is_known_kind("Event"));
        assert!(!config.is_known_kind("Pulse"));
    }

    #[test]
    fn coefficient_defaults_to_identity() {
        let config = ChartConfig::builtin();
        assert_eq!(config.coefficient("Infusion"), 12.0);
        assert_eq!(config.coefficient("Vtop"), 1.0);
        assert_eq!(config.coefficient("Event"), 1.0);
    }

    #[test]
    fn plotted_kinds_end_with_event() {
        let config = ChartConfig::builtin();
        let kinds = config.plotted_kinds();
        assert_eq!(kinds.last().copied(), Some(EVENT_KIND));
        assert!(kinds.contains(&"Vtail"));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ChartConfig::builtin();
        let json = serde_json::to_string_pretty(&config).expect("serialize config");
        let round: ChartConfig = serde_json::from_str(&json).expect("deserialize config");
        assert_eq!(round, config);
    }
}
