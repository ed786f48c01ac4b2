pub mod config;
pub mod error;
pub mod record;

pub use config::{
    AxisSide, AxisSpec, ChartConfig, EVENT_KIND, EVENT_SENTINEL_Y, LegacyColumn, LegacySchema,
    PointStyle, SeriesSpec, ValueRule,
};
pub use error::{ModelError, Result};
pub use record::{Field, Record, normalize_decimal};
