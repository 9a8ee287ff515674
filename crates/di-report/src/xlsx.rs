//! Excel output for the unified table and the cleaned workbook.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use di_ingest::{CellValue, SheetGrid, Workbook as SourceWorkbook};
use polars::prelude::{AnyValue, DataFrame};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::error::{ReportError, Result};

/// Sheet name used for the unified table.
pub const UNIFIED_SHEET_NAME: &str = "Unified";

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Days between the Excel epoch (1899-12-30) and 1970-01-01.
const EXCEL_UNIX_OFFSET: f64 = 25_569.0;

fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(chrono::NaiveTime::MIN)
}

/// Excel serial number of a timestamp.
fn excel_serial(value: NaiveDateTime) -> f64 {
    let delta = value - excel_epoch();
    delta.num_seconds() as f64 / 86_400.0
}

/// Writes a DataFrame to a single-sheet workbook.
///
/// Dates are written as real Excel dates, numbers as numbers and nulls as
/// empty cells. The header row is bold and frozen.
pub fn write_table_xlsx(df: &DataFrame, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    fill_table_sheet(workbook.add_worksheet(), df).map_err(|source| ReportError::Xlsx {
        path: path.to_path_buf(),
        source,
    })?;
    save(&mut workbook, path)
}

fn fill_table_sheet(sheet: &mut Worksheet, df: &DataFrame) -> std::result::Result<(), XlsxError> {
    let header = Format::new().set_bold();
    let date = Format::new().set_num_format(DATE_FORMAT);

    sheet.set_name(UNIFIED_SHEET_NAME)?;
    for (col, name) in df.get_column_names().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name.as_str(), &header)?;
    }

    for (col_idx, column) in df.get_columns().iter().enumerate() {
        let col = col_idx as u16;
        for row_idx in 0..df.height() {
            let row = (row_idx + 1) as u32;
            let Ok(value) = column.get(row_idx) else {
                continue;
            };
            match value {
                AnyValue::Null => {}
                AnyValue::Date(days) => {
                    sheet.write_number_with_format(
                        row,
                        col,
                        f64::from(days) + EXCEL_UNIX_OFFSET,
                        &date,
                    )?;
                }
                AnyValue::Boolean(flag) => {
                    sheet.write_boolean(row, col, flag)?;
                }
                AnyValue::String(text) => {
                    sheet.write_string(row, col, text)?;
                }
                AnyValue::StringOwned(ref text) => {
                    sheet.write_string(row, col, text.as_str())?;
                }
                other => match di_common::any_to_f64(other.clone()) {
                    Some(number) => {
                        sheet.write_number(row, col, number)?;
                    }
                    None => {
                        sheet.write_string(row, col, di_common::any_to_string(other))?;
                    }
                },
            }
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    sheet.autofit();
    Ok(())
}

/// Writes every sheet of a (partly) cleaned workbook, keeping sheet order,
/// cell types and any merged regions that remain.
pub fn write_cleaned_workbook(source: &SourceWorkbook, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    for grid in &source.sheets {
        fill_grid_sheet(workbook.add_worksheet(), grid).map_err(|source| ReportError::Xlsx {
            path: path.to_path_buf(),
            source,
        })?;
    }
    save(&mut workbook, path)
}

fn fill_grid_sheet(sheet: &mut Worksheet, grid: &SheetGrid) -> std::result::Result<(), XlsxError> {
    let date = Format::new().set_num_format(DATE_FORMAT);
    let datetime = Format::new().set_num_format(DATETIME_FORMAT);

    sheet.set_name(&grid.name)?;
    for (row_idx, cells) in grid.rows().iter().enumerate() {
        let row = row_idx as u32;
        for (col_idx, value) in cells.iter().enumerate() {
            let col = col_idx as u16;
            match value {
                CellValue::Empty => {}
                CellValue::Text(text) => {
                    sheet.write_string(row, col, text)?;
                }
                CellValue::Number(number) => {
                    sheet.write_number(row, col, *number)?;
                }
                CellValue::Bool(flag) => {
                    sheet.write_boolean(row, col, *flag)?;
                }
                CellValue::Date(stamp) => {
                    let format = if stamp.time() == chrono::NaiveTime::MIN {
                        &date
                    } else {
                        &datetime
                    };
                    sheet.write_number_with_format(row, col, excel_serial(*stamp), format)?;
                }
                CellValue::Error(code) => {
                    sheet.write_string(row, col, code)?;
                }
            }
        }
    }

    for range in grid.merged_regions() {
        let text = grid.get(range.start).render().unwrap_or_default();
        sheet.merge_range(
            range.start.row - 1,
            (range.start.col - 1) as u16,
            range.end.row - 1,
            (range.end.col - 1) as u16,
            &text,
            &Format::new(),
        )?;
    }
    Ok(())
}

fn save(workbook: &mut Workbook, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    workbook.save(path).map_err(|source| ReportError::Xlsx {
        path: path.to_path_buf(),
        source,
    })
}
