//! End-to-end runs of the process pipeline over authored workbooks.

use std::path::Path;

use di_cli::pipeline::{ProcessOptions, resolve_config, run_process};
use di_dashboard::{DashboardContext, ranking};
use di_ingest::read_unified_table;
use di_model::{MetricKind, Modality, OutputFormat, SchemaMismatch};
use polars::prelude::DataType;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet, XlsxError};
use tempfile::TempDir;

const HEADERS: [&str; 7] = [
    "Region",
    "Org Code",
    "Provider Name",
    "CT Activity",
    "MRI Activity",
    "CT Waiting List",
    "MRI Waiting List",
];

fn write_sheet(
    sheet: &mut Worksheet,
    name: &str,
    month: Option<u8>,
    rows: &[(&str, &str, &str)],
) -> Result<(), XlsxError> {
    sheet.set_name(name)?;
    sheet.merge_range(1, 2, 1, 5, "Diagnostic Imaging Dataset", &Format::new())?;
    sheet.merge_range(2, 2, 3, 5, "Provider level counts", &Format::new())?;
    if let Some(month) = month {
        sheet.write_datetime_with_format(
            4,
            2,
            &ExcelDateTime::from_ymd(2018, month, 1)?,
            &Format::new().set_num_format("dd/mm/yyyy"),
        )?;
    }
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(13, col as u16 + 1, *header)?;
    }
    for (i, (code, provider, ct)) in rows.iter().enumerate() {
        let row = 30 + i as u32;
        sheet.write_string(row, 1, "South West")?;
        sheet.write_string(row, 2, *code)?;
        if !provider.is_empty() {
            sheet.write_string(row, 3, *provider)?;
        }
        sheet.write_string(row, 4, *ct)?;
        sheet.write_number(row, 5, 10.0)?;
        sheet.write_number(row, 6, 100.0)?;
        sheet.write_number(row, 7, 50.0)?;
    }
    Ok(())
}

fn write_workbook(path: &Path, broken_sheet: bool) {
    let mut workbook = Workbook::new();
    workbook
        .add_worksheet()
        .set_name("Contents")
        .expect("name");
    write_sheet(
        workbook.add_worksheet(),
        "April 2018",
        Some(4),
        &[("RBD", "Dorset County", "120"), ("RD1", "Royal United", "80")],
    )
    .expect("april");
    write_sheet(
        workbook.add_worksheet(),
        "May 2018",
        Some(5),
        &[
            ("RBD", "Dorset County", "130"),
            ("RD1", "Royal United", "*"),
            ("ZZZ", "Unknown Trust", "1"),
            ("", "", "999"),
        ],
    )
    .expect("may");
    if broken_sheet {
        write_sheet(
            workbook.add_worksheet(),
            "June 2018",
            None,
            &[("RBD", "Dorset County", "140")],
        )
        .expect("june");
    }
    workbook.save(path).expect("save workbook");
}

fn write_lookup(path: &Path) {
    std::fs::write(
        path,
        "Org Code,STP\nRBD,Dorset\nRD1,\"Bath, Swindon and Wiltshire\"\n",
    )
    .expect("write lookup");
}

#[test]
fn process_writes_a_joined_unified_table() {
    let dir = TempDir::new().expect("temp dir");
    let workbook = dir.path().join("provider_tables.xlsx");
    let lookup = dir.path().join("stp.csv");
    write_workbook(&workbook, false);
    write_lookup(&lookup);

    let options = ProcessOptions {
        lookup: Some(lookup),
        cleaned_output: Some(dir.path().join("cleaned.xlsx")),
        ..ProcessOptions::new(&workbook)
    };
    let result = run_process(&options, &resolve_config(None).expect("config")).expect("process");

    assert!(!result.has_errors());
    assert_eq!(result.clean.cleaned.len(), 2);
    let report = &result.aggregate;
    assert_eq!(report.stacked_rows, 6);
    assert_eq!(report.missing_provider, 1);
    let join = report.join.as_ref().expect("join report");
    assert_eq!(join.matched, 4);
    assert_eq!(join.dropped, 1);
    assert!(join.unmatched_codes.contains("ZZZ"));
    assert_eq!(report.final_rows, 4);
    let ct = report
        .coercions
        .iter()
        .find(|coercion| coercion.column == "CT Activity")
        .expect("CT coercion");
    assert_eq!(ct.nulled, 1);

    let output = result.output.expect("output path");
    assert_eq!(output, dir.path().join("provider_tables_unified.xlsx"));
    assert!(dir.path().join("cleaned.xlsx").exists());

    let table = read_unified_table(&output).expect("read back");
    assert_eq!(table.height(), 4);
    assert_eq!(table.column("Period").expect("Period").dtype(), &DataType::Date);
    assert_eq!(table.column("STP").expect("STP").dtype(), &DataType::String);
    let names: Vec<&str> = table
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect();
    insta::assert_snapshot!(names.join(" | "), @"Region | Org Code | Provider Name | CT Activity | MRI Activity | CT Waiting List | MRI Waiting List | Period | STP");
}

#[test]
fn dashboard_reads_the_processed_table() {
    let dir = TempDir::new().expect("temp dir");
    let workbook = dir.path().join("provider_tables.xlsx");
    let lookup = dir.path().join("stp.csv");
    write_workbook(&workbook, false);
    write_lookup(&lookup);

    let config = resolve_config(None).expect("config");
    let options = ProcessOptions {
        lookup: Some(lookup),
        format: OutputFormat::Csv,
        ..ProcessOptions::new(&workbook)
    };
    let result = run_process(&options, &config).expect("process");
    let output = result.output.expect("output path");
    assert_eq!(output.extension().and_then(|ext| ext.to_str()), Some("csv"));

    let ctx = DashboardContext::load(&output, &config.dashboard).expect("context");
    assert_eq!(ctx.regions(), vec!["Bath, Swindon and Wiltshire", "Dorset"]);
    let entries = ranking(&ctx, Modality::Ct, MetricKind::Activity, 2).expect("ranking");
    assert_eq!(entries[0].region, "Dorset");
    assert_eq!(entries[0].value, 125.0);
    // The "*" in May counts as zero.
    assert_eq!(entries[1].value, 40.0);
}

#[test]
fn mismatching_sheet_is_skipped_and_flagged() {
    let dir = TempDir::new().expect("temp dir");
    let workbook = dir.path().join("tables.xlsx");
    write_workbook(&workbook, true);

    let options = ProcessOptions {
        dry_run: true,
        ..ProcessOptions::new(&workbook)
    };
    let result = run_process(&options, &resolve_config(None).expect("config")).expect("process");

    assert!(result.has_errors());
    assert_eq!(result.clean.cleaned.len(), 2);
    assert_eq!(result.clean.skipped.len(), 1);
    assert_eq!(result.clean.skipped[0].name, "June 2018");
    assert!(matches!(
        result.clean.skipped[0].reason,
        SchemaMismatch::MissingPeriod { .. }
    ));
    assert!(result.output.is_none());
    assert!(!dir.path().join("tables_unified.xlsx").exists());
    assert_eq!(result.table.height(), 5);
}

#[test]
fn all_sheets_skipped_still_reports_reasons() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("undated.xlsx");
    let mut workbook = Workbook::new();
    workbook
        .add_worksheet()
        .set_name("Contents")
        .expect("name");
    write_sheet(
        workbook.add_worksheet(),
        "June 2018",
        None,
        &[("RBD", "Dorset County", "140")],
    )
    .expect("june");
    workbook.save(&path).expect("save workbook");

    let result = run_process(
        &ProcessOptions::new(&path),
        &resolve_config(None).expect("config"),
    )
    .expect("process");

    assert!(result.has_errors());
    assert!(result.clean.cleaned.is_empty());
    assert_eq!(result.clean.skipped.len(), 1);
    assert!(matches!(
        result.clean.skipped[0].reason,
        SchemaMismatch::MissingPeriod { .. }
    ));
    assert_eq!(result.table.height(), 0);
    assert!(result.output.is_none());
    assert!(!dir.path().join("undated_unified.xlsx").exists());
}

#[test]
fn missing_workbook_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let options = ProcessOptions::new(dir.path().join("absent.xlsx"));
    let err = run_process(&options, &resolve_config(None).expect("config")).unwrap_err();
    assert!(format!("{err:#}").contains("load workbook"));
}
