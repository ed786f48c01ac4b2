//! Temporal ordering: mixed-format timestamp parsing and stable sorting.
//!
//! Two textual formats are accepted on input, the slash-delimited display
//! form and the ISO-like form some exports use. Everything is re-serialized
//! in the display form, so `parse(format(parse(s)))` is the identity at
//! minute granularity.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Display/storage format: `DD/MM/YYYY HH:MM`.
pub const CANONICAL_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Secondary accepted input format: `YYYY-MM-DD HH:MM:SS`.
const ISO_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemporalError {
    #[error(
        "'{value}' matches no accepted date format (DD/MM/YYYY HH:MM or YYYY-MM-DD HH:MM:SS)"
    )]
    UnrecognizedFormat { value: String },
}

/// Parse a timestamp string in either accepted format.
///
/// A string matching neither format is an error surfaced to the caller,
/// never silently dropped.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, TemporalError> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, CANONICAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, ISO_FORMAT))
        .map_err(|_| TemporalError::UnrecognizedFormat {
            value: trimmed.to_string(),
        })
}

/// Serialize a timestamp in the canonical display format.
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(CANONICAL_FORMAT).to_string()
}

/// Parse a sequence of timestamp strings, preserving input order.
pub fn parse_all<'a, I>(values: I) -> Result<Vec<NaiveDateTime>, TemporalError>
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().map(parse_timestamp).collect()
}

/// The permutation that sorts `instants` ascending.
///
/// Stable: entries with equal instants keep their relative input order.
pub fn sort_permutation(instants: &[NaiveDateTime]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..instants.len()).collect();
    order.sort_by_key(|&i| instants[i]);
    order
}
