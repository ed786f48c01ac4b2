//! Raw tabular payload exchanged with file adapters.
//!
//! Adapters move untyped cells; interpreting them as records (timestamp
//! parsing, schema mapping) is the caller's job. This keeps the adapter
//! contract small enough that a spreadsheet implementation can live
//! outside this crate.

use std::path::Path;

use crate::error::Result;

/// An untyped table: a header row plus string cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Index of a named column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(name))
    }

    /// Cell at (row, column); missing trailing cells read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", |s| s.as_str())
    }
}

/// Contract every backing-file adapter must satisfy.
///
/// `load` returns the whole table or fails without side effects; `save`
/// replaces the file contents wholesale and must not leave a partially
/// written file behind on failure.
pub trait TableFile {
    fn load(&self, path: &Path) -> Result<RawTable>;
    fn save(&self, path: &Path, table: &RawTable) -> Result<()>;
}
