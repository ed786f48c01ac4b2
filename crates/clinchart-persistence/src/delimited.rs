//! Delimited-text adapter built on the `csv` crate.

use std::fs::{self, File};
use std::path::Path;

use crate::error::{PersistenceError, Result};
use crate::table::{RawTable, TableFile};

/// Adapter for delimited text files with a configurable delimiter.
#[derive(Debug, Clone)]
pub struct DelimitedBackend {
    delimiter: u8,
}

impl DelimitedBackend {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for DelimitedBackend {
    fn default() -> Self {
        Self::new(b';')
    }
}

impl TableFile for DelimitedBackend {
    fn load(&self, path: &Path) -> Result<RawTable> {
        let file = File::open(path).map_err(|e| PersistenceError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| PersistenceError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut table = RawTable::new(columns);
        for record in reader.records() {
            let record = record.map_err(|e| PersistenceError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            table
                .rows
                .push(record.iter().map(|v| v.trim().to_string()).collect());
        }

        tracing::info!(
            path = %path.display(),
            rows = table.rows.len(),
            "loaded delimited file"
        );
        Ok(table)
    }

    /// Atomic save: write to a temp file in the same directory, then rename.
    fn save(&self, path: &Path, table: &RawTable) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        let file = File::create(&temp_path).map_err(|e| PersistenceError::Io {
            operation: "create",
            path: temp_path.clone(),
            source: e,
        })?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(file);

        let write_error = |e: csv::Error| PersistenceError::Malformed {
            path: temp_path.clone(),
            reason: e.to_string(),
        };
        writer.write_record(&table.columns).map_err(write_error)?;
        for row in &table.rows {
            writer.write_record(row).map_err(write_error)?;
        }
        writer.flush().map_err(|e| PersistenceError::Io {
            operation: "write",
            path: temp_path.clone(),
            source: e,
        })?;
        drop(writer);

        fs::rename(&temp_path, path).map_err(|e| PersistenceError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source: e,
        })?;

        tracing::info!(
            path = %path.display(),
            rows = table.rows.len(),
            "saved delimited file"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patient.csv");

        let mut table = RawTable::new(vec![
            "DATE".to_string(),
            "TYPE".to_string(),
            "VALUE".to_string(),
            "COMMENT".to_string(),
        ]);
        table.rows.push(vec![
            "01/01/2021 08:00".to_string(),
            "Vtop".to_string(),
            "45.5".to_string(),
            "morning check".to_string(),
        ]);

        let backend = DelimitedBackend::default();
        backend.save(&path, &table).unwrap();
        let loaded = backend.load(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn load_tolerates_short_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patient.csv");
        fs::write(&path, "DATE;TYPE;VALUE;COMMENT\n01/01/2021 08:00;Event;Surgery\n").unwrap();

        let table = DelimitedBackend::default().load(&path).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(0, 2), "Surgery");
        assert_eq!(table.cell(0, 3), "");
    }

    #[test]
    fn failed_save_leaves_no_partial_target() {
        let dir = tempdir().unwrap();
        // Target inside a directory that does not exist.
        let path = dir.path().join("missing").join("patient.csv");
        let table = RawTable::new(vec!["DATE".to_string()]);

        let result = DelimitedBackend::default().save(&path, &table);
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn respects_configured_delimiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patient.tsv");
        fs::write(&path, "DATE\tTYPE\tVALUE\tCOMMENT\n01/01/2021 08:00\tVtop\t45\t\n").unwrap();

        let table = DelimitedBackend::new(b'\t').load(&path).unwrap();
        assert_eq!(table.columns.len(), 4);
        assert_eq!(table.cell(0, 1), "Vtop");
    }
}
