//! Sheet cleaning against the fixed layout descriptor.
//!
//! A sheet is checked in full before anything is removed. When any check
//! fails the grid is returned untouched together with the mismatch.

use chrono::NaiveDate;
use di_common::parse_period_text;
use di_model::{CellRef, SchemaMismatch, SheetLayout};
use tracing::{debug, info, info_span, warn};

use crate::grid::{CellValue, SheetGrid};
use crate::workbook::Workbook;

/// A sheet that was cleaned successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedSheet {
    pub name: String,
    pub period: NaiveDate,
}

/// A sheet that was left as-is because it did not match the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSheet {
    pub name: String,
    pub reason: SchemaMismatch,
}

/// Outcome of cleaning every data sheet in a workbook.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    /// Cleaned sheets in workbook order.
    pub cleaned: Vec<CleanedSheet>,
    pub skipped: Vec<SkippedSheet>,
}

impl CleanReport {
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Reads the reporting period from the date cell.
pub fn read_period(grid: &SheetGrid, cell: CellRef) -> Result<NaiveDate, SchemaMismatch> {
    let value = grid.get(cell);
    let parsed = match value {
        CellValue::Date(datetime) => Some(datetime.date()),
        CellValue::Text(text) => parse_period_text(text),
        _ => None,
    };
    parsed.ok_or_else(|| SchemaMismatch::MissingPeriod {
        sheet: grid.name.clone(),
        cell,
        found: value.describe(),
    })
}

/// Checks a raw sheet against the layout and returns its period.
///
/// Nothing is modified.
pub fn validate_sheet(grid: &SheetGrid, layout: &SheetLayout) -> Result<NaiveDate, SchemaMismatch> {
    let sheet = &grid.name;
    let period = read_period(grid, layout.date_cell)?;

    for range in &layout.merged_titles {
        if !grid.is_merged(*range) {
            return Err(SchemaMismatch::MissingMergedRegion {
                sheet: sheet.clone(),
                range: *range,
            });
        }
    }

    // Each deletion is expressed in the coordinates left by the previous one.
    let mut height = grid.height();
    for span in &layout.row_deletions {
        if span.count == 0 {
            continue;
        }
        if span.end() > height {
            return Err(SchemaMismatch::RowsOutOfBounds {
                sheet: sheet.clone(),
                start: span.start,
                count: span.count,
                height,
            });
        }
        height -= span.count;
    }

    for header in &layout.required_headers {
        let found = (1..=grid.width()).any(|col| {
            grid.get(CellRef::new(layout.header_row, col))
                .render()
                .is_some_and(|text| header_matches(&text, header))
        });
        if !found {
            return Err(SchemaMismatch::MissingHeader {
                sheet: sheet.clone(),
                row: layout.header_row,
                column: header.clone(),
            });
        }
    }

    let spacer = layout.spacer_columns;
    for col in spacer.start..=spacer.end() {
        for row in layout.header_row..=grid.height() {
            if layout.map_row(row).is_none() {
                continue;
            }
            let cell = CellRef::new(row, col);
            if !grid.get(cell).is_blank() {
                return Err(SchemaMismatch::SpacerNotEmpty {
                    sheet: sheet.clone(),
                    cell,
                });
            }
        }
    }

    Ok(period)
}

fn header_matches(cell: &str, expected: &str) -> bool {
    let normalized = cell.split_whitespace().collect::<Vec<_>>().join(" ");
    normalized.eq_ignore_ascii_case(expected.trim())
}

/// Cleans one sheet in place.
///
/// Validates first; then removes the merged titles, applies the row deletions
/// in order and removes the spacer column. Returns the period and sheet name.
pub fn clean_sheet(
    grid: &mut SheetGrid,
    layout: &SheetLayout,
) -> Result<(NaiveDate, String), SchemaMismatch> {
    let period = validate_sheet(grid, layout)?;

    for range in &layout.merged_titles {
        grid.unmerge(*range);
    }
    for span in &layout.row_deletions {
        grid.delete_rows(span.start, span.count);
    }
    grid.delete_cols(layout.spacer_columns.start, layout.spacer_columns.count);

    debug!(
        sheet = %grid.name,
        %period,
        rows = grid.height(),
        cols = grid.width(),
        "cleaned sheet"
    );
    Ok((period, grid.name.clone()))
}

/// Cleans every sheet after the leading title pages.
///
/// A sheet that does not match the layout is recorded and skipped; the rest
/// are still cleaned.
pub fn clean_workbook(
    workbook: &mut Workbook,
    layout: &SheetLayout,
    skip_leading: usize,
) -> CleanReport {
    let clean_span = info_span!("clean", path = %workbook.path.display());
    let _guard = clean_span.enter();

    let mut report = CleanReport::default();
    for grid in workbook.data_sheets_mut(skip_leading) {
        let sheet_span = info_span!("sheet", name = %grid.name);
        let _sheet_guard = sheet_span.enter();
        match clean_sheet(grid, layout) {
            Ok((period, name)) => report.cleaned.push(CleanedSheet { name, period }),
            Err(reason) => {
                warn!(%reason, "skipping sheet");
                report.skipped.push(SkippedSheet {
                    name: grid.name.clone(),
                    reason,
                });
            }
        }
    }

    info!(
        cleaned = report.cleaned.len(),
        skipped = report.skipped.len(),
        "cleaning complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_model::{CellRange, RowSpan};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A minimal sheet with the default layout and `data_rows` provider rows.
    fn raw_sheet(data_rows: u32) -> SheetGrid {
        let mut grid = SheetGrid::new("April 2018", Vec::new());
        grid.set(CellRef::new(2, 3), CellValue::text("Diagnostic Imaging Dataset"));
        grid.set(CellRef::new(3, 3), CellValue::text("Provider counts"));
        grid.set(
            CellRef::new(5, 3),
            CellValue::Date(date(2018, 4, 1).and_hms_opt(0, 0, 0).unwrap()),
        );
        for (col, header) in ["Region", "Org Code", "Provider Name", "CT"]
            .into_iter()
            .enumerate()
        {
            grid.set(CellRef::new(14, col as u32 + 2), CellValue::text(header));
        }
        for i in 0..data_rows {
            let row = 31 + i;
            grid.set(CellRef::new(row, 2), CellValue::text("South West"));
            grid.set(CellRef::new(row, 3), CellValue::text(format!("R{i:02}")));
            grid.set(CellRef::new(row, 4), CellValue::text(format!("Trust {i}")));
            grid.set(CellRef::new(row, 5), CellValue::Number(f64::from(i * 10)));
        }
        grid.with_merged(vec![
            "C2:F2".parse::<CellRange>().unwrap(),
            "C3:F4".parse::<CellRange>().unwrap(),
        ])
    }

    #[test]
    fn test_clean_sheet_removes_boilerplate() {
        let mut grid = raw_sheet(3);
        let (period, name) = clean_sheet(&mut grid, &SheetLayout::default()).unwrap();

        assert_eq!(period, date(2018, 4, 1));
        assert_eq!(name, "April 2018");
        assert_eq!(grid.get(CellRef::new(1, 1)), &CellValue::text("Region"));
        assert_eq!(grid.get(CellRef::new(1, 2)), &CellValue::text("Org Code"));
        assert_eq!(grid.get(CellRef::new(2, 2)), &CellValue::text("R00"));
        assert_eq!(grid.height(), 4);
        assert!(grid.merged_regions().is_empty());
    }

    #[test]
    fn test_second_clean_fails_and_leaves_grid() {
        let mut grid = raw_sheet(2);
        clean_sheet(&mut grid, &SheetLayout::default()).unwrap();
        let snapshot = grid.clone();

        let err = clean_sheet(&mut grid, &SheetLayout::default()).unwrap_err();
        assert!(matches!(err, SchemaMismatch::MissingPeriod { .. }));
        assert_eq!(grid, snapshot);
    }

    #[test]
    fn test_text_period_is_accepted() {
        let mut grid = raw_sheet(1);
        grid.set(CellRef::new(5, 3), CellValue::text("Period: May 2018"));
        assert_eq!(
            validate_sheet(&grid, &SheetLayout::default()).unwrap(),
            date(2018, 5, 1)
        );
    }

    #[test]
    fn test_non_date_period_is_a_mismatch() {
        let mut grid = raw_sheet(1);
        grid.set(CellRef::new(5, 3), CellValue::Number(42.0));
        let err = validate_sheet(&grid, &SheetLayout::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sheet 'April 2018': expected a report date at C5, found number 42"
        );
    }

    #[test]
    fn test_missing_merge_is_a_mismatch() {
        let mut grid = raw_sheet(1);
        grid.unmerge("C3:F4".parse().unwrap());
        let before = grid.clone();
        let err = clean_sheet(&mut grid, &SheetLayout::default()).unwrap_err();
        assert!(matches!(err, SchemaMismatch::MissingMergedRegion { .. }));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_short_sheet_is_a_mismatch() {
        let mut grid = raw_sheet(0);
        grid.delete_rows(20, 100);
        let err = validate_sheet(&grid, &SheetLayout::default()).unwrap_err();
        assert!(matches!(
            err,
            SchemaMismatch::RowsOutOfBounds {
                start: 15,
                count: 16,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_header_is_a_mismatch() {
        let mut grid = raw_sheet(1);
        grid.set(CellRef::new(14, 4), CellValue::text("Trust"));
        let err = validate_sheet(&grid, &SheetLayout::default()).unwrap_err();
        assert!(matches!(
            err,
            SchemaMismatch::MissingHeader { ref column, .. } if column == "Provider Name"
        ));
    }

    #[test]
    fn test_spacer_with_data_is_a_mismatch() {
        let mut grid = raw_sheet(2);
        grid.set(CellRef::new(32, 1), CellValue::text("note"));
        let err = validate_sheet(&grid, &SheetLayout::default()).unwrap_err();
        assert_eq!(
            err,
            SchemaMismatch::SpacerNotEmpty {
                sheet: "April 2018".to_string(),
                cell: CellRef::new(32, 1),
            }
        );
    }

    #[test]
    fn test_spacer_ignores_deleted_gap_rows() {
        let mut grid = raw_sheet(1);
        grid.set(CellRef::new(20, 1), CellValue::text("footnote"));
        assert!(validate_sheet(&grid, &SheetLayout::default()).is_ok());
    }

    #[test]
    fn test_custom_row_deletions() {
        let layout = SheetLayout {
            row_deletions: vec![RowSpan::new(15, 16), RowSpan::new(1, 13)],
            ..SheetLayout::default()
        };
        let mut grid = raw_sheet(1);
        clean_sheet(&mut grid, &layout).unwrap();
        assert_eq!(grid.get(CellRef::new(2, 3)), &CellValue::text("Trust 0"));
    }

    #[test]
    fn test_clean_workbook_skips_bad_sheets() {
        let mut bad = raw_sheet(1);
        bad.name = "Notes".to_string();
        bad.set(CellRef::new(5, 3), CellValue::Empty);
        let mut workbook = Workbook {
            path: "tables.xlsx".into(),
            sheets: vec![
                SheetGrid::new("Title", vec![vec![CellValue::text("Contents")]]),
                raw_sheet(2),
                bad,
            ],
        };

        let report = clean_workbook(&mut workbook, &SheetLayout::default(), 1);
        assert_eq!(report.cleaned.len(), 1);
        assert_eq!(report.cleaned[0].name, "April 2018");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "Notes");
        assert!(report.has_skipped());
        // The title page is never touched.
        assert_eq!(workbook.sheets[0].height(), 1);
    }
}
