//! Workbook fixtures authored with rust_xlsxwriter and read back through calamine.

use std::path::Path;

use chrono::NaiveDate;
use di_ingest::{
    CellValue, IngestError, SheetTable, clean_sheet, clean_workbook, load_workbook,
    read_unified_table,
};
use di_model::{CellRef, SchemaMismatch, SheetLayout};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use tempfile::TempDir;

/// Writes one data sheet in the published layout (raw coordinates, 0-based here).
fn write_data_sheet(
    sheet: &mut Worksheet,
    name: &str,
    month: u8,
    providers: &[(&str, &str, f64)],
) -> Result<(), rust_xlsxwriter::XlsxError> {
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    sheet.set_name(name)?;
    sheet.merge_range(1, 2, 1, 5, "Diagnostic Imaging Dataset", &Format::new())?;
    sheet.merge_range(2, 2, 3, 5, "Provider level counts", &Format::new())?;
    sheet.write_datetime_with_format(
        4,
        2,
        &ExcelDateTime::from_ymd(2018, month, 1)?,
        &date_format,
    )?;
    for (col, header) in ["Region", "Org Code", "Provider Name", "CT", "MRI"]
        .iter()
        .enumerate()
    {
        sheet.write_string(13, col as u16 + 1, *header)?;
    }
    // Gap block rows 15..=30 hold national totals in the published files.
    sheet.write_string(15, 3, "England")?;
    sheet.write_number(15, 4, 99_999.0)?;
    for (i, (code, provider, ct)) in providers.iter().enumerate() {
        let row = 30 + i as u32;
        sheet.write_string(row, 1, "South West")?;
        sheet.write_string(row, 2, *code)?;
        if !provider.is_empty() {
            sheet.write_string(row, 3, *provider)?;
        }
        sheet.write_number(row, 4, *ct)?;
        sheet.write_string(row, 5, "N/A")?;
    }
    Ok(())
}

fn write_fixture(path: &Path) {
    let mut workbook = Workbook::new();
    workbook
        .add_worksheet()
        .set_name("Contents")
        .expect("name")
        .write_string(0, 0, "Tables 1a-1l")
        .expect("title");
    write_data_sheet(
        workbook.add_worksheet(),
        "April 2018",
        4,
        &[("RBD", "Dorset County", 120.0), ("RD1", "Royal United", 80.0)],
    )
    .expect("april");
    write_data_sheet(
        workbook.add_worksheet(),
        "May 2018",
        5,
        &[("RBD", "Dorset County", 130.0), ("ABC123", "", 5.0)],
    )
    .expect("may");
    workbook.save(path).expect("save workbook");
}

#[test]
fn loads_merges_and_date_from_xlsx() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("tables.xlsx");
    write_fixture(&path);

    let workbook = load_workbook(&path).expect("load workbook");
    assert_eq!(workbook.sheet_names(), vec!["Contents", "April 2018", "May 2018"]);

    let april = workbook.sheet("April 2018").expect("april sheet");
    assert!(april.is_merged("C2:F2".parse().unwrap()));
    assert!(april.is_merged("C3:F4".parse().unwrap()));
    match april.get(CellRef::new(5, 3)) {
        CellValue::Date(value) => {
            assert_eq!(value.date(), NaiveDate::from_ymd_opt(2018, 4, 1).unwrap());
        }
        other => panic!("expected a date at C5, found {other:?}"),
    }
    assert_eq!(april.get(CellRef::new(14, 3)), &CellValue::text("Org Code"));
}

#[test]
fn cleans_every_data_sheet() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("tables.xlsx");
    write_fixture(&path);

    let mut workbook = load_workbook(&path).expect("load workbook");
    let report = clean_workbook(&mut workbook, &SheetLayout::default(), 1);
    assert!(report.skipped.is_empty());
    let periods: Vec<_> = report
        .cleaned
        .iter()
        .map(|sheet| (sheet.name.as_str(), sheet.period.to_string()))
        .collect();
    assert_eq!(
        periods,
        vec![("April 2018", "2018-04-01".to_string()), ("May 2018", "2018-05-01".to_string())]
    );

    let april = SheetTable::from_grid(workbook.sheet("April 2018").unwrap());
    assert_eq!(
        april.headers,
        vec!["Region", "Org Code", "Provider Name", "CT", "MRI"]
    );
    assert_eq!(april.height(), 2);
    assert_eq!(april.rows[0][2].as_deref(), Some("Dorset County"));
    assert_eq!(april.rows[0][3].as_deref(), Some("120"));

    let contents = workbook.sheet("Contents").unwrap();
    assert_eq!(contents.get(CellRef::new(1, 1)), &CellValue::text("Tables 1a-1l"));
}

#[test]
fn cleaning_twice_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("tables.xlsx");
    write_fixture(&path);

    let mut workbook = load_workbook(&path).expect("load workbook");
    let layout = SheetLayout::default();
    let grid = &mut workbook.sheets[1];
    clean_sheet(grid, &layout).expect("first clean");
    let cleaned = grid.clone();

    let err = clean_sheet(grid, &layout).expect_err("second clean");
    assert!(matches!(err, SchemaMismatch::MissingPeriod { .. }));
    assert_eq!(*grid, cleaned);
}

#[test]
fn rejects_non_xlsx_inputs() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("tables.ods");
    std::fs::write(&path, b"not a workbook").expect("write file");
    let err = load_workbook(&path).expect_err("unsupported");
    assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
}

#[test]
fn reads_back_an_xlsx_unified_table() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("unified.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    for (col, header) in ["Org Code", "STP", "CT Activity", "Period"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).expect("header");
    }
    sheet.write_string(1, 0, "RBD").expect("code");
    sheet.write_string(1, 1, "Dorset").expect("stp");
    sheet.write_number(1, 2, 120.0).expect("ct");
    sheet
        .write_datetime_with_format(
            1,
            3,
            &ExcelDateTime::from_ymd(2018, 4, 1).expect("date"),
            &date_format,
        )
        .expect("period");
    workbook.save(&path).expect("save");

    let df = read_unified_table(&path).expect("read unified");
    assert_eq!(df.height(), 1);
    assert_eq!(
        df.column("Period").unwrap().dtype(),
        &polars::prelude::DataType::Date
    );
    assert_eq!(
        df.column("CT Activity").unwrap().dtype(),
        &polars::prelude::DataType::Float64
    );
}
