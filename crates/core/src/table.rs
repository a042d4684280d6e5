use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of a loaded table.
///
/// `Missing` marks a cell the source file had no data for. It is distinct
/// from `Text("")`: only `Missing` cells count toward row/column cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Missing,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            // Spreadsheet integers arrive as floats; render 10.0 as "10".
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// An in-memory table: ordered named columns over ordered rows.
///
/// Every row holds exactly one cell per column; `push_row` pads short rows
/// with `Missing` and drops cells past the last column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Missing);
        self.rows.push(row);
    }

    /// Index of the first column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Apply `f` to every cell of the named column. Returns `false` (leaving
    /// the table untouched) when no such column exists.
    pub fn rewrite_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        true
    }

    /// Drop every row and every column whose cells are all `Missing`.
    ///
    /// Both removal sets are decided against the table as loaded: whether a
    /// cell counts as missing never depends on the other pass. Surviving rows
    /// keep their relative order. A table with no rows keeps its columns.
    pub fn cleaned(self) -> Table {
        let keep_rows: Vec<usize> = (0..self.rows.len())
            .filter(|&r| self.rows[r].iter().any(|c| !c.is_missing()))
            .collect();
        let keep_cols: Vec<usize> = if self.rows.is_empty() {
            (0..self.columns.len()).collect()
        } else {
            (0..self.columns.len())
                .filter(|&c| self.rows.iter().any(|row| !row[c].is_missing()))
                .collect()
        };

        let columns = keep_cols.iter().map(|&c| self.columns[c].clone()).collect();
        let rows = keep_rows
            .iter()
            .map(|&r| keep_cols.iter().map(|&c| self.rows[r][c].clone()).collect())
            .collect();

        Table { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::text(s)
    }

    fn two_column_table() -> Table {
        let mut table = Table::new(vec!["payee".to_string(), "amount".to_string()]);
        table.push_row(vec![text("ACME INC"), text("10")]);
        table.push_row(vec![CellValue::Missing, CellValue::Missing]);
        table
    }

    #[test]
    fn cleaned_drops_all_missing_rows() {
        let table = two_column_table().cleaned();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows()[0][0], text("ACME INC"));
    }

    #[test]
    fn cleaned_drops_all_missing_columns() {
        let mut table = Table::new(vec!["payee".to_string(), "notes".to_string()]);
        table.push_row(vec![text("ACME"), CellValue::Missing]);
        table.push_row(vec![text("GLOBEX"), CellValue::Missing]);

        let table = table.cleaned();
        assert_eq!(table.columns(), ["payee"]);
        assert_eq!(table.rows()[1], vec![text("GLOBEX")]);
    }

    #[test]
    fn cleaned_keeps_partially_filled_rows_and_columns() {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        table.push_row(vec![text("x"), CellValue::Missing]);
        table.push_row(vec![CellValue::Missing, text("y")]);

        let table = table.cleaned();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn empty_text_is_not_missing() {
        let mut table = Table::new(vec!["a".to_string()]);
        table.push_row(vec![text("")]);

        let table = table.cleaned();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 1);
    }

    #[test]
    fn cleaned_with_no_rows_keeps_columns() {
        let table = Table::new(vec!["a".to_string(), "b".to_string()]).cleaned();
        assert_eq!(table.columns(), ["a", "b"]);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn push_row_pads_and_truncates() {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        table.push_row(vec![text("only")]);
        table.push_row(vec![text("1"), text("2"), text("extra")]);

        assert_eq!(table.rows()[0], vec![text("only"), CellValue::Missing]);
        assert_eq!(table.rows()[1], vec![text("1"), text("2")]);
    }

    #[test]
    fn rewrite_column_applies_to_every_cell() {
        let mut table = two_column_table();
        let changed = table.rewrite_column("payee", |cell| match cell {
            CellValue::Missing => CellValue::Missing,
            other => CellValue::text(other.to_string().to_lowercase()),
        });

        assert!(changed);
        assert_eq!(table.rows()[0][0], text("acme inc"));
        // Missing cells stay missing.
        assert_eq!(table.rows()[1][0], CellValue::Missing);
        // Other columns untouched.
        assert_eq!(table.rows()[0][1], text("10"));
    }

    #[test]
    fn rewrite_column_reports_absent_column() {
        let mut table = two_column_table();
        let before = table.clone();
        let changed = table.rewrite_column("merchant", |c| c.clone());

        assert!(!changed);
        assert_eq!(table, before);
    }

    #[test]
    fn display_renders_integral_numbers_without_fraction() {
        assert_eq!(CellValue::Number(10.0).to_string(), "10");
        assert_eq!(CellValue::Number(10.5).to_string(), "10.5");
        assert_eq!(CellValue::Missing.to_string(), "");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
    }
}
