use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use payscrub_core::CellValue;

use crate::rules::{MappingError, PayeeMapper};
use crate::{load_table, write_table, ImportError};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Column names and behavior switches for one processing run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub payee_column: String,
    /// Accepted for forward compatibility; not consulted yet.
    pub date_column: Option<String>,
    /// Accepted for forward compatibility; not consulted yet.
    pub amount_column: Option<String>,
    /// Leading raw rows to discard before the header.
    pub skip_rows: usize,
    /// Drop fully-empty rows and columns after loading.
    pub clean_data: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        ProcessOptions {
            payee_column: "payee".to_string(),
            date_column: None,
            amount_column: None,
            skip_rows: 0,
            clean_data: true,
        }
    }
}

/// Orchestrates one file: load → clean → rewrite payee column → write.
pub struct TransactionProcessor {
    mapper: PayeeMapper,
}

impl TransactionProcessor {
    pub fn new(mapper: PayeeMapper) -> Self {
        TransactionProcessor { mapper }
    }

    /// Build a processor from a YAML rule file on disk.
    pub fn from_rule_file(path: &Path) -> Result<Self, ProcessError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ImportError::unreadable(path, e))?;
        Ok(Self::new(PayeeMapper::from_yaml(&content)?))
    }

    pub fn mapper(&self) -> &PayeeMapper {
        &self.mapper
    }

    pub fn process_file(
        &self,
        input: &Path,
        output: &Path,
        options: &ProcessOptions,
    ) -> Result<(), ProcessError> {
        let mut table = load_table(input, options.skip_rows)?;
        info!(
            "loaded {} ({} rows, {} columns)",
            input.display(),
            table.row_count(),
            table.column_count()
        );

        if options.clean_data {
            let (rows, columns) = (table.row_count(), table.column_count());
            table = table.cleaned();
            debug!(
                "cleaning dropped {} rows and {} columns",
                rows - table.row_count(),
                columns - table.column_count()
            );
        }

        let rewritten = table.rewrite_column(&options.payee_column, |cell| match cell {
            CellValue::Missing => CellValue::Missing,
            present => CellValue::text(self.mapper.map_payee(&present.to_string())),
        });
        if !rewritten {
            // Documented no-op: a table without the payee column passes
            // through unchanged.
            debug!(
                "payee column `{}` not present, leaving table as-is",
                options.payee_column
            );
        }

        write_table(output, &table)?;
        info!("wrote {}", output.display());
        Ok(())
    }
}
