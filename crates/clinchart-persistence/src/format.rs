//! Backing-file format detection by extension.

use std::path::Path;

use crate::error::{PersistenceError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimited text (.csv, .tsv, .txt).
    Delimited,
    /// Spreadsheet workbook (.xlsx, .xls, .ods); served by an externally
    /// registered adapter.
    Spreadsheet,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<FileFormat> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "tsv" | "txt" => Ok(FileFormat::Delimited),
            "xlsx" | "xls" | "ods" => Ok(FileFormat::Spreadsheet),
            _ => Err(PersistenceError::UnsupportedExtension {
                path: path.to_path_buf(),
            }),
        }
    }
}
