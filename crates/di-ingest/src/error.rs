//! Error types for workbook and lookup ingestion.

use std::path::PathBuf;

use di_model::SchemaMismatch;
use thiserror::Error;

/// Errors that can occur while reading workbooks and lookup tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// File extension is not one we can read.
    #[error("unsupported file type for {path} (expected .xlsx or .csv)")]
    UnsupportedFormat { path: PathBuf },

    // === Workbook Errors ===
    /// Failed to open an xlsx workbook.
    #[error("failed to open workbook {path}: {message}")]
    WorkbookOpen { path: PathBuf, message: String },

    /// Failed to read one worksheet.
    #[error("failed to read sheet '{sheet}' in {path}: {message}")]
    SheetRead {
        path: PathBuf,
        sheet: String,
        message: String,
    },

    /// Workbook has no sheets left after skipping title pages.
    #[error("workbook {path} has no data sheets")]
    NoDataSheets { path: PathBuf },

    // === Table Errors ===
    /// Failed to parse a CSV file.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Required column missing from a lookup or table file.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    /// Sheet did not match the expected layout.
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("data/tables.xlsx"),
        };
        assert_eq!(err.to_string(), "file not found: data/tables.xlsx");
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("STP".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
