//! Error types for table aggregation.

use di_model::SchemaMismatch;
use thiserror::Error;

/// Errors raised while building the unified table.
#[derive(Debug, Error)]
pub enum TransformError {
    /// No cleaned sheet was available to stack.
    #[error("no cleaned sheets to aggregate")]
    NoSheets,

    /// A cleaned sheet named in the report is missing from the workbook.
    #[error("cleaned sheet '{name}' is not in the workbook")]
    UnknownSheet { name: String },

    /// The stacked table does not have the expected columns.
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
