use std::path::PathBuf;

use thiserror::Error;

use crate::cell::{CellRange, CellRef};

/// A sheet or table that does not have the shape the pipeline expects.
///
/// Raised before any mutation happens, so the offending sheet is left intact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    #[error("sheet '{sheet}': expected a report date at {cell}, found {found}")]
    MissingPeriod {
        sheet: String,
        cell: CellRef,
        found: String,
    },

    #[error("sheet '{sheet}': merged title region {range} is not present")]
    MissingMergedRegion { sheet: String, range: CellRange },

    #[error(
        "sheet '{sheet}': cannot delete {count} row(s) from row {start}, sheet has {height} row(s)"
    )]
    RowsOutOfBounds {
        sheet: String,
        start: u32,
        count: u32,
        height: u32,
    },

    #[error("sheet '{sheet}': header row {row} has no '{column}' column")]
    MissingHeader {
        sheet: String,
        row: u32,
        column: String,
    },

    #[error("sheet '{sheet}': spacer column holds data at {cell}")]
    SpacerNotEmpty { sheet: String, cell: CellRef },

    #[error("column '{column}' not found in table")]
    MissingColumn { column: String },

    #[error("metric columns {start}..{end} exceed the {width} data column(s) available")]
    MetricRangeOutOfBounds {
        start: usize,
        end: usize,
        width: usize,
    },
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid cell reference '{value}'")]
    InvalidCellRef { value: String },

    #[error("invalid cell range '{value}'")]
    InvalidRange { value: String },

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
