use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use payscrub_core::{CellValue, Table};

use crate::{table_from_rows, ImportError};

/// Read the first worksheet of a spreadsheet file into a table.
pub(crate) fn load_sheet(path: &Path, skip_rows: usize) -> Result<Table, ImportError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::unreadable(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::unreadable(path, "workbook has no sheets"))?
        .map_err(|e| ImportError::unreadable(path, e))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_sheet).collect())
        .collect();
    table_from_rows(path, rows, skip_rows)
}

fn cell_from_sheet(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Missing,
        Data::String(s) if s.is_empty() => CellValue::Missing,
        Data::String(s) => CellValue::text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.clone()),
        // Cell errors (#DIV/0! and friends) carry no usable value.
        Data::Error(_) => CellValue::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_error_cells_load_as_missing() {
        assert_eq!(cell_from_sheet(&Data::Empty), CellValue::Missing);
        assert_eq!(
            cell_from_sheet(&Data::Error(calamine::CellErrorType::Div0)),
            CellValue::Missing
        );
        assert_eq!(
            cell_from_sheet(&Data::String(String::new())),
            CellValue::Missing
        );
    }

    #[test]
    fn typed_cells_keep_their_values() {
        assert_eq!(
            cell_from_sheet(&Data::String("ACME INC".to_string())),
            CellValue::text("ACME INC")
        );
        assert_eq!(cell_from_sheet(&Data::Int(10)), CellValue::Number(10.0));
        assert_eq!(cell_from_sheet(&Data::Float(10.5)), CellValue::Number(10.5));
        assert_eq!(cell_from_sheet(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn load_sheet_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_sheet(&dir.path().join("absent.xlsx"), 0);
        assert!(matches!(result, Err(ImportError::UnreadableSource { .. })));
    }
}
