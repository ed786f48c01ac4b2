//! The ordered record store for the currently open file.
//!
//! Always kept sorted ascending by timestamp after any mutation; a stale
//! unsorted state is never observable. The sort is stable, so records
//! sharing a timestamp keep their relative order.

use clinchart_model::{Field, Record, normalize_decimal};

use crate::error::{CoreError, Result};
use crate::temporal::parse_timestamp;

/// Result of an in-place cell edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellEdit {
    /// Row position of the edited record after the edit. Differs from the
    /// input row only when a timestamp edit moved the record.
    pub row: usize,
    /// Whether the edit forced a re-sort (timestamp edits only).
    pub resorted: bool,
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    dirty: bool,
    /// Bulk-load guard: suppresses dirty-marking while the table is being
    /// repopulated programmatically rather than edited by the user.
    loading: bool,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn begin_bulk_load(&mut self) {
        self.loading = true;
    }

    pub fn end_bulk_load(&mut self) {
        self.loading = false;
    }

    pub fn is_bulk_loading(&self) -> bool {
        self.loading
    }

    fn mark_dirty(&mut self) {
        if !self.loading {
            self.dirty = true;
        }
    }

    fn resort(&mut self) {
        // Vec::sort_by_key is stable; ties keep input order.
        self.records.sort_by_key(|r| r.timestamp);
    }

    /// Replace the contents wholesale, sort, and clear the dirty flag.
    pub fn load(&mut self, records: Vec<Record>) {
        self.begin_bulk_load();
        self.records = records;
        self.resort();
        self.dirty = false;
        self.end_bulk_load();
        tracing::debug!(rows = self.records.len(), "store loaded");
    }

    /// Append new records and re-sort.
    pub fn insert(&mut self, records: Vec<Record>) {
        if records.is_empty() {
            return;
        }
        let added = records.len();
        self.records.extend(records);
        self.resort();
        self.mark_dirty();
        tracing::debug!(added, rows = self.records.len(), "records inserted");
    }

    /// Delete rows by their positions in the current (pre-deletion)
    /// ordering. Duplicates are ignored; any out-of-range index fails the
    /// whole operation before anything is removed.
    pub fn delete_at(&mut self, rows: &[usize]) -> Result<Vec<Record>> {
        let len = self.records.len();
        if let Some(&bad) = rows.iter().find(|&&r| r >= len) {
            return Err(CoreError::RowOutOfRange { row: bad, len });
        }

        let mut ordered: Vec<usize> = rows.to_vec();
        ordered.sort_unstable();
        ordered.dedup();
        if ordered.is_empty() {
            return Ok(Vec::new());
        }

        // Removing from the back keeps the remaining pre-deletion indices
        // valid.
        let mut removed = Vec::with_capacity(ordered.len());
        for &row in ordered.iter().rev() {
            removed.push(self.records.remove(row));
        }
        removed.reverse();

        self.mark_dirty();
        tracing::debug!(deleted = removed.len(), rows = self.records.len(), "rows deleted");
        Ok(removed)
    }

    /// Write raw text into one cell of the identified record.
    ///
    /// The decimal separator is normalized before storage. Editing the
    /// DATE cell re-parses the timestamp (surfacing a parse error without
    /// touching the record) and re-sorts; other cells leave the order
    /// untouched.
    pub fn edit_cell(&mut self, row: usize, field: Field, raw: &str) -> Result<CellEdit> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(row)
            .ok_or(CoreError::RowOutOfRange { row, len })?;

        let mut edit = CellEdit {
            row,
            resorted: false,
        };
        match field {
            Field::Date => {
                let timestamp = parse_timestamp(raw)?;
                record.timestamp = timestamp;
                // Re-insert at the sorted position; among equal timestamps
                // the edited record lands last, matching a fresh arrival.
                let record = self.records.remove(row);
                let target = self
                    .records
                    .partition_point(|r| r.timestamp <= record.timestamp);
                self.records.insert(target, record);
                edit = CellEdit {
                    row: target,
                    resorted: true,
                };
            }
            Field::Type => record.kind = raw.trim().to_string(),
            Field::Value => record.value = normalize_decimal(raw.trim()),
            Field::Comment => record.comment = raw.to_string(),
        }

        self.mark_dirty();
        tracing::debug!(row = edit.row, field = %field, "cell edited");
        Ok(edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::{format_timestamp, parse_timestamp};

    fn record(date: &str, kind: &str, value: &str) -> Record {
        Record::new(parse_timestamp(date).unwrap(), kind, value, "")
    }

    fn six_row_store() -> RecordStore {
        let mut store = RecordStore::new();
        store.load(vec![
            record("01/01/2021 08:00", "Vtop", "40"),
            record("01/01/2021 09:00", "Vtop", "41"),
            record("01/01/2021 10:00", "Vtop", "42"),
            record("01/01/2021 11:00", "Vtop", "43"),
            record("01/01/2021 12:00", "Vtop", "44"),
            record("01/01/2021 13:00", "Vtop", "45"),
        ]);
        store
    }

    #[test]
    fn load_sorts_and_clears_dirty() {
        let mut store = RecordStore::new();
        store.load(vec![
            record("02/01/2021 08:00", "Vtop", "40"),
            record("01/01/2021 08:00", "Vtop", "41"),
        ]);
        assert_eq!(store.records()[0].value, "41");
        assert!(!store.is_dirty());
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let mut store = RecordStore::new();
        store.load(vec![
            record("01/01/2021 08:00", "Vtop", "first"),
            record("01/01/2021 08:00", "Vtail", "second"),
            record("01/01/2021 07:00", "Enoxa", "earlier"),
        ]);
        let values: Vec<&str> = store.records().iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["earlier", "first", "second"]);
    }

    #[test]
    fn insert_resorts_and_marks_dirty() {
        let mut store = six_row_store();
        store.insert(vec![record("01/01/2021 08:30", "Vtail", "7")]);
        assert!(store.is_dirty());
        assert_eq!(store.records()[1].kind, "Vtail");
    }

    #[test]
    fn delete_resolves_indices_against_pre_deletion_order() {
        // Deleting rows {2, 5} removes exactly those two original records
        // regardless of removal order.
        let mut store = six_row_store();
        let removed = store.delete_at(&[2, 5]).unwrap();
        assert_eq!(removed[0].value, "42");
        assert_eq!(removed[1].value, "45");

        let left: Vec<&str> = store.records().iter().map(|r| r.value.as_str()).collect();
        assert_eq!(left, vec!["40", "41", "43", "44"]);

        // Same result with the indices given in reverse.
        let mut store = six_row_store();
        let removed = store.delete_at(&[5, 2]).unwrap();
        assert_eq!(removed[0].value, "42");
        assert_eq!(removed[1].value, "45");
    }

    #[test]
    fn deleting_nothing_does_not_mark_the_store_dirty() {
        let mut store = six_row_store();
        let removed = store.delete_at(&[]).unwrap();
        assert!(removed.is_empty());
        assert_eq!(store.len(), 6);
        assert!(!store.is_dirty());
    }

    #[test]
    fn delete_rejects_stale_indices_without_removing_anything() {
        let mut store = six_row_store();
        assert!(store.delete_at(&[1, 6]).is_err());
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn value_edit_normalizes_decimal_and_keeps_order() {
        let mut store = six_row_store();
        let edit = store.edit_cell(1, Field::Value, "12,5").unwrap();
        assert_eq!(edit, CellEdit { row: 1, resorted: false });
        assert_eq!(store.records()[1].value, "12.5");
        assert!(store.is_dirty());

        // "12,5" -> "12.5" is a no-op on the numeric meaning.
        store.edit_cell(1, Field::Value, "12.5").unwrap();
        assert_eq!(store.records()[1].numeric_value(), Some(12.5));
    }

    #[test]
    fn date_edit_reparses_and_resorts() {
        let mut store = six_row_store();
        let edit = store.edit_cell(0, Field::Date, "01/01/2021 12:30").unwrap();
        assert!(edit.resorted);
        assert_eq!(edit.row, 4);
        assert_eq!(
            format_timestamp(store.records()[4].timestamp),
            "01/01/2021 12:30"
        );
    }

    #[test]
    fn bad_date_edit_is_surfaced_and_leaves_the_record_alone() {
        let mut store = six_row_store();
        let before = store.records()[0].clone();
        assert!(store.edit_cell(0, Field::Date, "not a date").is_err());
        assert_eq!(store.records()[0], before);
    }

    #[test]
    fn bulk_load_guard_suppresses_dirty_marking() {
        let mut store = six_row_store();
        store.begin_bulk_load();
        store.edit_cell(0, Field::Value, "41").unwrap();
        store.end_bulk_load();
        assert!(!store.is_dirty());

        store.edit_cell(0, Field::Value, "42").unwrap();
        assert!(store.is_dirty());
    }
}
