pub mod csv;
pub mod process;
pub mod rules;
pub mod sheet;

pub use process::{ProcessError, ProcessOptions, TransactionProcessor};
pub use rules::{MappingError, MappingRule, PayeeMapper, RuleSet};

use std::fmt;
use std::path::Path;

use thiserror::Error;

use payscrub_core::{CellValue, Table};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unreadable source `{path}`: {reason}")]
    UnreadableSource { path: String, reason: String },
    #[error("unwritable destination `{path}`: {reason}")]
    UnwritableDestination { path: String, reason: String },
}

impl ImportError {
    pub fn unreadable(path: &Path, reason: impl fmt::Display) -> Self {
        ImportError::UnreadableSource {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unwritable(path: &Path, reason: impl fmt::Display) -> Self {
        ImportError::UnwritableDestination {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// File extensions routed to the spreadsheet loader; everything else is read
/// as comma-separated text.
const SHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Load a table from disk, dispatching on the file-name suffix.
pub fn load_table(path: &Path, skip_rows: usize) -> Result<Table, ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some(ext) if SHEET_EXTENSIONS.contains(&ext) => sheet::load_sheet(path, skip_rows),
        _ => csv::load_csv(path, skip_rows),
    }
}

/// Serialize a table as comma-separated text, creating parent directories.
pub fn write_table(path: &Path, table: &Table) -> Result<(), ImportError> {
    csv::write_csv(path, table)
}

/// Interpret raw source rows: discard `skip_rows` leading rows, take the next
/// row as column headers, and load the remainder as data.
pub(crate) fn table_from_rows(
    path: &Path,
    rows: Vec<Vec<CellValue>>,
    skip_rows: usize,
) -> Result<Table, ImportError> {
    let mut rows = rows.into_iter().skip(skip_rows);
    let header = rows
        .next()
        .ok_or_else(|| ImportError::unreadable(path, "no header row"))?;
    let columns: Vec<String> = header.iter().map(|cell| cell.to_string()).collect();
    if columns.iter().all(|name| name.is_empty()) {
        return Err(ImportError::unreadable(path, "no columns"));
    }

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::text(s)
    }

    #[test]
    fn table_from_rows_skips_leading_rows_before_the_header() {
        let rows = vec![
            vec![text("export generated 2024-01-15")],
            vec![text("payee"), text("amount")],
            vec![text("ACME"), text("10")],
        ];
        let table = table_from_rows(Path::new("in.csv"), rows, 1).unwrap();
        assert_eq!(table.columns(), ["payee", "amount"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn table_from_rows_fails_without_a_header() {
        let result = table_from_rows(Path::new("in.csv"), vec![], 0);
        assert!(matches!(result, Err(ImportError::UnreadableSource { .. })));
    }

    #[test]
    fn table_from_rows_fails_when_every_header_is_empty() {
        let rows = vec![vec![CellValue::Missing, CellValue::Missing]];
        let result = table_from_rows(Path::new("in.csv"), rows, 0);
        assert!(matches!(result, Err(ImportError::UnreadableSource { .. })));
    }
}
