//! Reading a persisted unified table back into a typed DataFrame.

use std::path::Path;

use calamine::{Reader, Xlsx, open_workbook};
use di_common::{days_since_epoch, parse_f64, parse_period_text};
use di_model::PERIOD_COLUMN;
use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::table::SheetTable;
use crate::workbook::grid_from_range;

/// Reads a unified table written by the report stage (`.xlsx` or `.csv`).
///
/// `Period` becomes a `Date` column; any other column whose values all parse
/// as numbers becomes `Float64`; everything else stays `String`.
pub fn read_unified_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let raw = match extension.as_deref() {
        Some("xlsx" | "xlsm") => read_first_sheet(path)?,
        Some("csv") => read_string_csv(path)?,
        _ => {
            return Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };
    let typed = infer_column_types(&raw)?;
    tracing::info!(
        path = %path.display(),
        rows = typed.height(),
        columns = typed.width(),
        "loaded unified table"
    );
    Ok(typed)
}

fn read_first_sheet(path: &Path) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| IngestError::WorkbookOpen {
        path: path.to_path_buf(),
        message: format!("{e}"),
    })?;
    let Some(name) = workbook.sheet_names().first().cloned() else {
        return Err(IngestError::NoDataSheets {
            path: path.to_path_buf(),
        });
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| IngestError::SheetRead {
            path: path.to_path_buf(),
            sheet: name.clone(),
            message: format!("{e}"),
        })?;
    let grid = grid_from_range(&name, &range, &[]);
    Ok(SheetTable::from_grid(&grid).to_string_frame()?)
}

fn read_string_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Types a frame of `String` columns.
pub fn infer_column_types(df: &DataFrame) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let strings = column.cast(&DataType::String)?;
        let values = strings.str()?;
        let typed: Column = if column.name().as_str() == PERIOD_COLUMN {
            let days: Vec<Option<i32>> = values
                .into_iter()
                .map(|value| value.and_then(parse_period_text).map(days_since_epoch))
                .collect();
            Series::new(column.name().clone(), days)
                .cast(&DataType::Date)?
                .into()
        } else if is_numeric(values) {
            let numbers: Vec<Option<f64>> = values
                .into_iter()
                .map(|value| value.and_then(parse_f64))
                .collect();
            Series::new(column.name().clone(), numbers).into()
        } else {
            strings
        };
        columns.push(typed);
    }
    Ok(DataFrame::new(columns)?)
}

fn is_numeric(values: &StringChunked) -> bool {
    let mut any = false;
    for value in values.into_iter().flatten() {
        if value.trim().is_empty() {
            continue;
        }
        if parse_f64(value).is_none() {
            return false;
        }
        any = true;
    }
    any
}
