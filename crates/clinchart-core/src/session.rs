//! The editing session: one open record set bound to one backing file.
//!
//! The session object is owned by the application root and passed by
//! reference to whoever needs the store, the capability table, or the
//! file binding — there is no ambient global state. File I/O is
//! synchronous; every operation either completes or fails with prior
//! state untouched.

use std::path::{Path, PathBuf};

use clinchart_model::ChartConfig;
use clinchart_persistence::{BackendRegistry, TableFile};

use crate::error::{CoreError, Result};
use crate::form::{EventForm, FormOutcome, expand_form};
use crate::schema::{decode_table, encode_table};
use crate::store::RecordStore;

pub struct Session {
    config: ChartConfig,
    store: RecordStore,
    registry: BackendRegistry,
    binding: Option<PathBuf>,
}

impl Session {
    pub fn new(config: ChartConfig) -> Self {
        let registry = BackendRegistry::new(config.delimiter as u8);
        Self {
            config,
            store: RecordStore::new(),
            registry,
            binding: None,
        }
    }

    /// Install an external spreadsheet adapter.
    pub fn register_spreadsheet(&mut self, backend: Box<dyn TableFile + Send>) {
        self.registry.register_spreadsheet(backend);
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    /// Path of the bound backing file, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.binding.as_deref()
    }

    pub fn file_name(&self) -> Option<String> {
        self.binding
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.is_dirty()
    }

    /// Open a backing file, replacing the current binding.
    ///
    /// Prompting to save the previous file's unsaved changes is the
    /// shell's job (`has_unsaved_changes`); by the time `open` is called
    /// the prior binding is discarded. Decode failures leave the current
    /// store and binding untouched.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let backend = self.registry.backend_for(path)?;
        let table = backend.load(path)?;
        let records = decode_table(&table, &self.config)?;

        self.store.load(records);
        self.binding = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), rows = self.store.len(), "file opened");
        Ok(())
    }

    /// Create a fresh backing file holding only the canonical header and
    /// bind to it.
    pub fn create(&mut self, path: &Path) -> Result<()> {
        let backend = self.registry.backend_for(path)?;
        backend.save(path, &encode_table(&[]))?;

        self.store.load(Vec::new());
        self.binding = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), "file created");
        Ok(())
    }

    /// Write the store to the bound file and clear the dirty flag.
    pub fn save(&mut self) -> Result<()> {
        let path = self.binding.clone().ok_or(CoreError::NoFileBound)?;
        let backend = self.registry.backend_for(&path)?;
        backend.save(&path, &encode_table(self.store.records()))?;
        self.store.mark_saved();
        Ok(())
    }

    /// Write the store to a new backing file and rebind to it.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let backend = self.registry.backend_for(path)?;
        backend.save(path, &encode_table(self.store.records()))?;
        self.binding = Some(path.to_path_buf());
        self.store.mark_saved();
        Ok(())
    }

    /// Drop the file binding (and its store contents).
    pub fn close_binding(&mut self) {
        self.binding = None;
        self.store.load(Vec::new());
    }

    /// Run a form submission through validation/expansion and insert the
    /// records that passed. The rejected-field list comes back for the
    /// shell to report in one batch.
    pub fn submit_form(&mut self, form: &EventForm) -> Result<FormOutcome> {
        let outcome = expand_form(form, &self.config)?;
        self.store.insert(outcome.records.clone());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldInput;
    use crate::temporal::parse_timestamp;
    use std::fs;
    use tempfile::tempdir;

    fn session() -> Session {
        Session::new(ChartConfig::builtin())
    }

    #[test]
    fn create_open_save_cycle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patient.csv");

        let mut session = session();
        session.create(&path).unwrap();
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.file_name().as_deref(), Some("patient.csv"));

        let mut form = EventForm::new(parse_timestamp("01/01/2021 08:00").unwrap());
        form.fields.push(FieldInput {
            kind: "Vtop".to_string(),
            raw: "45".to_string(),
            repeat: None,
        });
        let outcome = session.submit_form(&form).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert!(session.has_unsaved_changes());

        session.save().unwrap();
        assert!(!session.has_unsaved_changes());

        let mut reopened = self::session();
        reopened.open(&path).unwrap();
        assert_eq!(reopened.store().len(), 1);
        assert_eq!(reopened.store().records()[0].kind, "Vtop");
    }

    #[test]
    fn open_failure_leaves_prior_state_untouched() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.csv");
        let bad = dir.path().join("bad.csv");
        fs::write(&good, "DATE;TYPE;VALUE;COMMENT\n01/01/2021 08:00;Vtop;45;\n").unwrap();
        fs::write(&bad, "DATE;TYPE;VALUE;COMMENT\nnot a date;Vtop;45;\n").unwrap();

        let mut session = session();
        session.open(&good).unwrap();
        assert!(session.open(&bad).is_err());

        assert_eq!(session.file_name().as_deref(), Some("good.csv"));
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn unrecognized_extension_is_rejected() {
        let mut session = session();
        let error = session.open(Path::new("notes.pdf")).unwrap_err();
        assert!(matches!(error, CoreError::Persistence(_)));
    }

    #[test]
    fn save_without_binding_fails() {
        let mut session = session();
        assert!(matches!(session.save(), Err(CoreError::NoFileBound)));
    }

    #[test]
    fn switching_files_discards_the_prior_binding() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");

        let mut session = session();
        session.create(&first).unwrap();
        session.create(&second).unwrap();
        assert_eq!(session.file_name().as_deref(), Some("b.csv"));

        session.close_binding();
        assert!(session.file_path().is_none());
        assert!(session.store().is_empty());
    }
}
