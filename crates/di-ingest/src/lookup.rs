//! Organisation-code to region lookup tables.
//!
//! The lookup is a two-column table (code and region label) stored either as
//! the first sheet of an xlsx workbook or as a CSV file.

use std::collections::BTreeMap;
use std::path::Path;

use calamine::{Reader, Xlsx, open_workbook};
use di_common::any_to_string_non_empty;
use di_model::LookupConfig;
use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::table::{SheetTable, normalize_header, normalize_headers};
use crate::workbook::grid_from_range;

/// Mapping from organisation code to region label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionLookup {
    entries: BTreeMap<String, String>,
}

impl RegionLookup {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(code, region)| (code.into().trim().to_string(), region.into()))
            .collect();
        Self { entries }
    }

    pub fn region_for(&self, code: &str) -> Option<&str> {
        self.entries.get(code.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads a region lookup from `.xlsx` or `.csv`.
///
/// Rows with a blank code or region are ignored. When a code appears more
/// than once the first occurrence wins.
pub fn load_region_lookup(path: &Path, config: &LookupConfig) -> Result<RegionLookup> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let df = match extension.as_deref() {
        Some("xlsx" | "xlsm") => read_lookup_xlsx(path)?,
        Some("csv") => read_lookup_csv(path)?,
        _ => {
            return Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };
    let lookup = lookup_from_frame(&df, config, path)?;
    tracing::info!(path = %path.display(), entries = lookup.len(), "loaded region lookup");
    Ok(lookup)
}

fn read_lookup_xlsx(path: &Path) -> Result<DataFrame> {
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
    let mut grid = grid_from_range(&name, &range, &[]);
    trim_to_used_area(&mut grid);
    Ok(SheetTable::from_grid(&grid).to_string_frame()?)
}

/// Drops leading empty rows and columns so the header lands in row 1.
fn trim_to_used_area(grid: &mut crate::grid::SheetGrid) {
    let first_row = grid
        .rows()
        .iter()
        .position(|row| row.iter().any(|cell| !cell.is_blank()));
    if let Some(first_row) = first_row
        && first_row > 0
    {
        grid.delete_rows(1, first_row as u32);
    }
    let first_col = (0..grid.width() as usize).find(|&col| {
        grid.rows()
            .iter()
            .any(|row| row.get(col).is_some_and(|cell| !cell.is_blank()))
    });
    if let Some(first_col) = first_col
        && first_col > 0
    {
        grid.delete_cols(1, first_col as u32);
    }
}

fn read_lookup_csv(path: &Path) -> Result<DataFrame> {
    let csv_error = |e: ::csv::Error| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let raw: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    let headers = normalize_headers(&raw);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let row: Vec<Option<String>> = (0..headers.len())
            .map(|idx| {
                record
                    .get(idx)
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            })
            .collect();
        if row.iter().any(Option::is_some) {
            rows.push(row);
        }
    }
    Ok(SheetTable { headers, rows }.to_string_frame()?)
}

fn find_column<'a>(df: &'a DataFrame, wanted: &str, path: &Path) -> Result<&'a Column> {
    let wanted = normalize_header(wanted);
    df.get_columns()
        .iter()
        .find(|column| normalize_header(column.name()).eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| IngestError::MissingColumn {
            column: wanted.clone(),
            path: path.to_path_buf(),
        })
}

fn lookup_from_frame(df: &DataFrame, config: &LookupConfig, path: &Path) -> Result<RegionLookup> {
    let codes = find_column(df, &config.code_column, path)?;
    let regions = find_column(df, &config.region_column, path)?;

    let mut entries = BTreeMap::new();
    for idx in 0..df.height() {
        let code = codes.get(idx).ok().and_then(any_to_string_non_empty);
        let region = regions.get(idx).ok().and_then(any_to_string_non_empty);
        if let (Some(code), Some(region)) = (code, region) {
            entries
                .entry(code.trim().to_string())
                .or_insert_with(|| region.trim().to_string());
        }
    }
    Ok(RegionLookup { entries })
}
