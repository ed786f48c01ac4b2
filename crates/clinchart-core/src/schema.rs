//! File schema: conversion between raw adapter tables and records.
//!
//! Canonical files carry the four-column `DATE;TYPE;VALUE;COMMENT`
//! schema. Legacy wide files (one column per measurement kind) are
//! accepted read-only: each non-empty measurement cell becomes one
//! normalized record. Saving always writes the canonical schema.

use clinchart_model::{ChartConfig, EVENT_KIND, Field, Record, normalize_decimal};
use clinchart_persistence::RawTable;

use crate::error::{CoreError, Result};
use crate::temporal::{format_timestamp, parse_timestamp};

/// Decode a raw table, auto-detecting the canonical or the configured
/// legacy schema by its header row.
pub fn decode_table(table: &RawTable, config: &ChartConfig) -> Result<Vec<Record>> {
    if is_canonical(table) {
        return decode_canonical(table);
    }
    if let Some(legacy) = &config.legacy_schema
        && table.column_index(&legacy.date_column).is_some()
        && legacy
            .value_columns
            .iter()
            .any(|c| table.column_index(&c.column).is_some())
    {
        return decode_legacy(table, config);
    }
    Err(CoreError::SchemaMismatch {
        expected: canonical_headings().join(", "),
        found: table.columns.join(", "),
    })
}

fn canonical_headings() -> Vec<String> {
    Field::ALL.iter().map(|f| f.heading().to_string()).collect()
}

fn is_canonical(table: &RawTable) -> bool {
    table.columns.len() == Field::ALL.len()
        && Field::ALL
            .iter()
            .zip(&table.columns)
            .all(|(field, column)| column.trim().eq_ignore_ascii_case(field.heading()))
}

/// Decode the canonical four-column schema.
///
/// A timestamp matching neither accepted format aborts the decode with
/// its row number; nothing is partially loaded.
pub fn decode_canonical(table: &RawTable) -> Result<Vec<Record>> {
    let mut records = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let timestamp = parse_timestamp(table.cell(row, Field::Date.index())).map_err(|e| {
            CoreError::RowTimestamp {
                row: row + 1,
                source: e,
            }
        })?;
        records.push(Record::new(
            timestamp,
            table.cell(row, Field::Type.index()).trim(),
            normalize_decimal(table.cell(row, Field::Value.index()).trim()),
            table.cell(row, Field::Comment.index()),
        ));
    }
    Ok(records)
}

/// Decode a legacy wide-schema table into normalized records.
///
/// Every non-empty measurement cell in a row becomes one record at the
/// row's timestamp; the row's comment is shared by all of them.
pub fn decode_legacy(table: &RawTable, config: &ChartConfig) -> Result<Vec<Record>> {
    let legacy = config
        .legacy_schema
        .as_ref()
        .ok_or_else(|| CoreError::SchemaMismatch {
            expected: canonical_headings().join(", "),
            found: table.columns.join(", "),
        })?;

    let date_col = table
        .column_index(&legacy.date_column)
        .ok_or_else(|| CoreError::SchemaMismatch {
            expected: legacy.date_column.clone(),
            found: table.columns.join(", "),
        })?;
    let comment_col = table.column_index(&legacy.comment_column);
    let event_col = table.column_index(&legacy.event_column);

    let mut records = Vec::new();
    for row in 0..table.rows.len() {
        let timestamp =
            parse_timestamp(table.cell(row, date_col)).map_err(|e| CoreError::RowTimestamp {
                row: row + 1,
                source: e,
            })?;
        let comment = comment_col.map_or("", |c| table.cell(row, c));

        for mapping in &legacy.value_columns {
            let Some(col) = table.column_index(&mapping.column) else {
                continue;
            };
            let value = table.cell(row, col).trim();
            if value.is_empty() {
                continue;
            }
            records.push(Record::new(
                timestamp,
                mapping.kind.clone(),
                normalize_decimal(value),
                comment,
            ));
        }

        if let Some(col) = event_col {
            let event = table.cell(row, col).trim();
            if !event.is_empty() {
                records.push(Record::new(timestamp, EVENT_KIND, event, comment));
            }
        }
    }
    Ok(records)
}

/// Encode records into the canonical table, timestamps in display form.
pub fn encode_table(records: &[Record]) -> RawTable {
    let mut table = RawTable::new(canonical_headings());
    for record in records {
        table.rows.push(vec![
            format_timestamp(record.timestamp),
            record.kind.clone(),
            record.value.clone(),
            record.comment.clone(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_table() -> RawTable {
        let mut table = RawTable::new(canonical_headings());
        table.rows.push(vec![
            "01/01/2021 08:00".to_string(),
            "Vtop".to_string(),
            "45,5".to_string(),
            "morning".to_string(),
        ]);
        table.rows.push(vec![
            "2021-01-01 09:00:00".to_string(),
            "Event".to_string(),
            "Surgery".to_string(),
            String::new(),
        ]);
        table
    }

    #[test]
    fn canonical_decode_parses_both_date_formats_and_normalizes_decimals() {
        let records = decode_canonical(&canonical_table()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, "45.5");
        assert_eq!(records[1].timestamp, parse_timestamp("01/01/2021 09:00").unwrap());
    }

    #[test]
    fn bad_timestamp_aborts_with_its_row_number() {
        let mut table = canonical_table();
        table.rows[1][0] = "soon".to_string();
        let error = decode_canonical(&table).unwrap_err();
        assert!(matches!(error, CoreError::RowTimestamp { row: 2, .. }));
    }

    #[test]
    fn unknown_header_is_a_schema_mismatch() {
        let table = RawTable::new(vec!["WHEN".to_string(), "WHAT".to_string()]);
        let error = decode_table(&table, &ChartConfig::builtin()).unwrap_err();
        assert!(matches!(error, CoreError::SchemaMismatch { .. }));
    }

    #[test]
    fn legacy_wide_row_expands_into_one_record_per_non_empty_cell() {
        let config = ChartConfig::builtin();
        let mut table = RawTable::new(vec![
            "Date".to_string(),
            "Vtop".to_string(),
            "Vtail".to_string(),
            "Enoxa".to_string(),
            "Event".to_string(),
            "Comment".to_string(),
        ]);
        table.rows.push(vec![
            "01/01/2021 08:00".to_string(),
            "45".to_string(),
            String::new(),
            "4000".to_string(),
            "Surgery".to_string(),
            "shared note".to_string(),
        ]);

        let records = decode_table(&table, &config).unwrap();
        let kinds: Vec<&str> = records.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Vtop", "Enoxa", EVENT_KIND]);
        assert!(records.iter().all(|r| r.comment == "shared note"));
    }

    #[test]
    fn encode_writes_canonical_headings_and_display_dates() {
        let records = decode_canonical(&canonical_table()).unwrap();
        let table = encode_table(&records);
        assert_eq!(table.columns, canonical_headings());
        // The ISO input is re-serialized canonically.
        assert_eq!(table.rows[1][0], "01/01/2021 09:00");
    }
}
