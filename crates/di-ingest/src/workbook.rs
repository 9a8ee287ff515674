//! Workbook loading through calamine.
//!
//! Every sheet is materialised as a [`SheetGrid`] in absolute coordinates, so
//! `C5` in the grid is `C5` in the spreadsheet even when calamine's used range
//! starts further in.

use std::path::{Path, PathBuf};

use calamine::{Data, Dimensions, Range, Reader, Xlsx, open_workbook};
use di_common::parse_period_text;
use di_model::{CellRange, CellRef};

use crate::error::{IngestError, Result};
use crate::grid::{CellValue, SheetGrid};

/// An ordered collection of named sheets.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub path: PathBuf,
    pub sheets: Vec<SheetGrid>,
}

impl Workbook {
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetGrid> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// Sheets after the leading title pages.
    pub fn data_sheets_mut(&mut self, skip_leading: usize) -> &mut [SheetGrid] {
        let start = skip_leading.min(self.sheets.len());
        &mut self.sheets[start..]
    }
}

/// Opens an xlsx workbook and reads every sheet with its merged regions.
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !is_xlsx(path) {
        return Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| IngestError::WorkbookOpen {
        path: path.to_path_buf(),
        message: format!("{e}"),
    })?;
    workbook
        .load_merged_regions()
        .map_err(|e| IngestError::WorkbookOpen {
            path: path.to_path_buf(),
            message: format!("failed to load merged regions: {e}"),
        })?;

    let names = workbook.sheet_names();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| IngestError::SheetRead {
                path: path.to_path_buf(),
                sheet: name.clone(),
                message: format!("{e}"),
            })?;
        let merged = match workbook.worksheet_merge_cells(&name) {
            Some(Ok(dimensions)) => dimensions,
            Some(Err(e)) => {
                return Err(IngestError::SheetRead {
                    path: path.to_path_buf(),
                    sheet: name,
                    message: format!("failed to read merged cells: {e}"),
                });
            }
            None => Vec::new(),
        };
        tracing::debug!(
            sheet = %name,
            rows = range.height(),
            cols = range.width(),
            merged = merged.len(),
            "read sheet"
        );
        sheets.push(grid_from_range(&name, &range, &merged));
    }

    Ok(Workbook {
        path: path.to_path_buf(),
        sheets,
    })
}

fn is_xlsx(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xlsm"))
}

/// Builds a grid from a calamine range, placing cells at their absolute positions.
///
/// Trailing rows and columns holding no values are left out.
pub(crate) fn grid_from_range(name: &str, range: &Range<Data>, merged: &[Dimensions]) -> SheetGrid {
    let mut rows = Vec::new();
    if let Some((row0, col0)) = range.start() {
        let (row0, col0) = (row0 as usize, col0 as usize);
        let mut used_width = 0;
        let mut used_height = 0;
        rows.resize_with(row0, Vec::new);
        rows.reserve(range.height());
        for (r, source) in range.rows().enumerate() {
            let mut cells = vec![CellValue::Empty; col0];
            cells.extend(source.iter().map(convert_cell));
            if let Some(last) = cells.iter().rposition(|cell| *cell != CellValue::Empty) {
                used_width = used_width.max(last + 1);
                used_height = row0 + r + 1;
            }
            rows.push(cells);
        }
        rows.truncate(used_height);
        for cells in &mut rows {
            cells.resize(used_width, CellValue::Empty);
        }
    }
    let grid = SheetGrid::new(name, rows);
    let regions = merged
        .iter()
        .map(|dims| {
            CellRange::new(
                CellRef::new(dims.start.0 + 1, dims.start.1 + 1),
                CellRef::new(dims.end.0 + 1, dims.end.1 + 1),
            )
        })
        .collect();
    grid.with_merged(regions)
}

fn convert_cell(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::Date(ndt),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_period_text(s.trim_end_matches('Z')) {
            Some(date) => CellValue::Date(date.and_time(chrono::NaiveTime::MIN)),
            None => CellValue::Text(s.clone()),
        },
        Data::Error(e) => CellValue::Error(format!("{e}")),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_from_range_uses_absolute_positions() {
        let mut range: Range<Data> = Range::new((1, 2), (2, 3));
        range.set_value((1, 2), Data::String("Title".to_string()));
        range.set_value((2, 3), Data::Float(5.0));
        let merged = vec![Dimensions {
            start: (1, 2),
            end: (1, 5),
        }];

        let grid = grid_from_range("Sheet", &range, &merged);
        assert_eq!(grid.get(CellRef::new(2, 3)), &CellValue::text("Title"));
        assert_eq!(grid.get(CellRef::new(3, 4)), &CellValue::Number(5.0));
        assert!(grid.is_merged("C2:F2".parse().unwrap()));
    }

    #[test]
    fn test_empty_range_gives_empty_grid() {
        let range: Range<Data> = Range::empty();
        let grid = grid_from_range("Empty", &range, &[]);
        assert_eq!(grid.height(), 0);
        assert_eq!(grid.width(), 0);
    }

    #[test]
    fn test_grid_from_large_range() {
        let (height, width) = (20_000u32, 12u32);
        let mut range: Range<Data> = Range::new((0, 0), (height - 1, width - 1));
        for row in 0..height {
            for col in 0..width {
                range.set_value((row, col), Data::Float(f64::from(row * width + col)));
            }
        }

        let started = std::time::Instant::now();
        let grid = grid_from_range("Unified", &range, &[]);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(grid.height(), height);
        assert_eq!(grid.width(), width);
        assert_eq!(
            grid.get(CellRef::new(height, width)),
            &CellValue::Number(f64::from(height * width - 1))
        );
    }

    #[test]
    fn test_trailing_empty_cells_are_trimmed() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 3));
        range.set_value((1, 1), Data::String("kept".to_string()));
        let grid = grid_from_range("Sheet", &range, &[]);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 2);
    }

    #[test]
    fn test_load_missing_workbook() {
        let err = load_workbook(Path::new("/nonexistent/tables.xlsx")).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }

    #[test]
    fn test_convert_iso_datetime() {
        let value = convert_cell(&Data::DateTimeIso("2018-04-01T00:00:00".to_string()));
        assert!(matches!(value, CellValue::Date(_)));
    }
}
