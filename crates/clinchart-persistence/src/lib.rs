//! Flat-file persistence for clinchart record logs.
//!
//! This crate owns the adapter contract (`TableFile`) and ships the
//! delimited-text implementation. Spreadsheet formats are recognized by
//! `FileFormat` and dispatched through `BackendRegistry`, but their
//! adapters are external collaborators registered at startup.

pub mod delimited;
pub mod error;
pub mod format;
pub mod table;

pub use delimited::DelimitedBackend;
pub use error::{PersistenceError, Result};
pub use format::FileFormat;
pub use table::{RawTable, TableFile};

use std::path::Path;

/// Maps a backing-file path to the adapter serving its format.
pub struct BackendRegistry {
    delimited: DelimitedBackend,
    spreadsheet: Option<Box<dyn TableFile + Send>>,
}

impl BackendRegistry {
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimited: DelimitedBackend::new(delimiter),
            spreadsheet: None,
        }
    }

    /// Install an external spreadsheet adapter.
    pub fn register_spreadsheet(&mut self, backend: Box<dyn TableFile + Send>) {
        self.spreadsheet = Some(backend);
    }

    /// Resolve the adapter for `path`, erroring on unknown extensions and
    /// on spreadsheet files when no adapter has been registered.
    pub fn backend_for(&self, path: &Path) -> Result<&dyn TableFile> {
        match FileFormat::from_path(path)? {
            FileFormat::Delimited => Ok(&self.delimited),
            FileFormat::Spreadsheet => match self.spreadsheet.as_deref() {
                Some(backend) => Ok(backend),
                None => Err(PersistenceError::NoAdapter {
                    extension: path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("spreadsheet")
                        .to_string(),
                    path: path.to_path_buf(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    impl std::fmt::Debug for dyn TableFile + '_ {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("dyn TableFile")
        }
    }

    #[test]
    fn registry_serves_delimited_and_rejects_bare_spreadsheet() {
        let registry = BackendRegistry::new(b';');
        assert!(registry.backend_for(&PathBuf::from("a.csv")).is_ok());

        let error = registry.backend_for(&PathBuf::from("a.xlsx")).unwrap_err();
        assert!(matches!(error, PersistenceError::NoAdapter { .. }));

        let error = registry.backend_for(&PathBuf::from("a.doc")).unwrap_err();
        assert!(matches!(
            error,
            PersistenceError::UnsupportedExtension { .. }
        ));
    }

    struct NullSpreadsheet;

    impl TableFile for NullSpreadsheet {
        fn load(&self, _path: &Path) -> Result<RawTable> {
            Ok(RawTable::default())
        }
        fn save(&self, _path: &Path, _table: &RawTable) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn registered_spreadsheet_adapter_is_dispatched() {
        let mut registry = BackendRegistry::new(b';');
        registry.register_spreadsheet(Box::new(NullSpreadsheet));
        assert!(registry.backend_for(&PathBuf::from("a.ods")).is_ok());
    }
}
