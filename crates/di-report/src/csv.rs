//! CSV output for the unified table.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::error::{ReportError, Result};

/// Writes a DataFrame as comma-separated text with a header row.
///
/// Dates are written as ISO `YYYY-MM-DD`; nulls as empty fields.
pub fn write_table_csv(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut out)
        .map_err(|e| ReportError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
