use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// One timestamped clinical observation or event.
///
/// `value` is stored as entered (string-encoded) so that free-text event
/// values and numeric measurements share one table schema. The decimal
/// separator is normalized to `.` before the value is ever interpreted
/// numerically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: NaiveDateTime,
    /// Series/category tag, e.g. a measurement kind or "Event".
    pub kind: String,
    pub value: String,
    pub comment: String,
}

impl Record {
    pub fn new(
        timestamp: NaiveDateTime,
        kind: impl Into<String>,
        value: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            kind: kind.into(),
            value: normalize_decimal(&value.into()),
            comment: comment.into(),
        }
    }

    /// Numeric reading of the stored value, if it has one.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok()
    }
}

/// The four canonical table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Field {
    Date,
    Type,
    Value,
    Comment,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Date, Field::Type, Field::Value, Field::Comment];

    /// Canonical header spelling for this column.
    pub fn heading(&self) -> &'static str {
        match self {
            Field::Date => "DATE",
            Field::Type => "TYPE",
            Field::Value => "VALUE",
            Field::Comment => "COMMENT",
        }
    }

    /// Column position in the canonical schema.
    pub fn index(&self) -> usize {
        match self {
            Field::Date => 0,
            Field::Type => 1,
            Field::Value => 2,
            Field::Comment => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Field> {
        Field::ALL.get(index).copied()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.heading())
    }
}

impl FromStr for Field {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DATE" => Ok(Field::Date),
            "TYPE" => Ok(Field::Type),
            "VALUE" => Ok(Field::Value),
            "COMMENT" => Ok(Field::Comment),
            other => Err(ModelError::UnknownColumn(other.to_string())),
        }
    }
}

/// Normalize the decimal separator to `.`.
///
/// Both `.` and `,` are accepted on input; everything downstream
/// (storage, plotting, persistence) sees `.` only.
pub fn normalize_decimal(raw: &str) -> String {
    raw.replace(',', ".")
}
