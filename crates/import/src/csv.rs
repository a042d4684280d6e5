use std::path::Path;

use payscrub_core::{CellValue, Table};

use crate::{table_from_rows, ImportError};

/// Read comma-separated text into a table. Empty fields load as `Missing`;
/// every other field is kept verbatim as text, so untouched columns survive
/// a load/write cycle byte-for-byte.
pub(crate) fn load_csv(path: &Path, skip_rows: usize) -> Result<Table, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ImportError::unreadable(path, e))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::unreadable(path, e))?;
        rows.push(record.iter().map(cell_from_field).collect());
    }

    table_from_rows(path, rows, skip_rows)
}

fn cell_from_field(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Missing
    } else {
        CellValue::text(field)
    }
}

/// Write a table as comma-separated text: header row first, no index column,
/// `Missing` cells as empty fields. Parent directories are created as needed.
pub(crate) fn write_csv(path: &Path, table: &Table) -> Result<(), ImportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ImportError::unwritable(path, e))?;
        }
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| ImportError::unwritable(path, e))?;
    writer
        .write_record(table.columns())
        .map_err(|e| ImportError::unwritable(path, e))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(|e| ImportError::unwritable(path, e))?;
    }
    writer.flush().map_err(|e| ImportError::unwritable(path, e))
}
