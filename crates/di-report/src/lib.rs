//! Report generation for the unified diagnostic-imaging table.
//!
//! - **Unified table**: xlsx (dates as real Excel dates) or csv
//! - **Cleaned workbook**: the intermediate workbook after sheet cleaning

mod csv;
mod error;
mod xlsx;

use std::path::{Path, PathBuf};

use di_model::OutputFormat;
use polars::prelude::DataFrame;
use tracing::{info, info_span};

pub use csv::write_table_csv;
pub use error::{ReportError, Result};
pub use xlsx::{UNIFIED_SHEET_NAME, write_cleaned_workbook, write_table_xlsx};

/// Writes the unified table in the requested format.
///
/// The file extension is replaced to match `format`. Returns the path written.
pub fn write_unified(df: &DataFrame, path: &Path, format: OutputFormat) -> Result<PathBuf> {
    let output = path.with_extension(format.extension());
    let span = info_span!("write", path = %output.display(), ?format);
    let _guard = span.enter();

    match format {
        OutputFormat::Xlsx => write_table_xlsx(df, &output)?,
        OutputFormat::Csv => write_table_csv(df, &output)?,
    }
    info!(rows = df.height(), columns = df.width(), "wrote unified table");
    Ok(output)
}
