//! Builds the unified table from the cleaned sheets of one workbook.

use di_ingest::{CleanedSheet, RegionLookup, SheetTable, Workbook};
use di_model::PipelineConfig;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{info, info_span};

use crate::cleanup::{ColumnCoercion, coerce_metrics, drop_missing_provider};
use crate::error::{Result, TransformError};
use crate::frame::{attach_period, sheet_to_frame, stack_frames};
use crate::join::{JoinReport, join_regions};

/// Counters collected while aggregating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub sheets: usize,
    /// Rows after stacking, before any filtering.
    pub stacked_rows: usize,
    pub missing_provider: usize,
    pub coercions: Vec<ColumnCoercion>,
    /// Present when a region lookup was supplied.
    pub join: Option<JoinReport>,
    pub final_rows: usize,
}

/// The unified table together with how it was produced.
#[derive(Debug, Clone)]
pub struct UnifiedTable {
    pub frame: DataFrame,
    pub report: AggregateReport,
}

/// Turns cleaned sheets into one period-tagged table.
///
/// Stages: per-sheet frame with `Period`, diagonal stack, provider filter,
/// metric coercion, and the optional inner join on org code.
pub fn build_unified_table(
    workbook: &Workbook,
    cleaned: &[CleanedSheet],
    config: &PipelineConfig,
    lookup: Option<&RegionLookup>,
) -> Result<UnifiedTable> {
    let span = info_span!("aggregate", sheets = cleaned.len());
    let _guard = span.enter();

    let mut frames = Vec::with_capacity(cleaned.len());
    for sheet in cleaned {
        let grid = workbook
            .sheet(&sheet.name)
            .ok_or_else(|| TransformError::UnknownSheet {
                name: sheet.name.clone(),
            })?;
        let table = SheetTable::from_grid(grid);
        let frame = attach_period(sheet_to_frame(&table)?, sheet.period)?;
        tracing::debug!(sheet = %sheet.name, rows = frame.height(), "sheet frame");
        frames.push(frame);
    }

    let stacked = stack_frames(frames)?;
    let mut report = AggregateReport {
        sheets: cleaned.len(),
        stacked_rows: stacked.height(),
        ..AggregateReport::default()
    };

    let (filtered, missing_provider) = drop_missing_provider(&stacked, &config.columns.provider)?;
    report.missing_provider = missing_provider;

    let (mut frame, coercions) = coerce_metrics(
        filtered,
        config.columns.metric_start,
        config.columns.metric_end,
    )?;
    report.coercions = coercions;

    if let Some(lookup) = lookup {
        let join_span = info_span!("join", entries = lookup.len());
        let _join_guard = join_span.enter();
        let (joined, join_report) = join_regions(
            &frame,
            lookup,
            &config.columns.org_code,
            &config.lookup.region_column,
        )?;
        info!(
            matched = join_report.matched,
            dropped = join_report.dropped,
            "joined regions"
        );
        frame = joined;
        report.join = Some(join_report);
    }

    report.final_rows = frame.height();
    info!(
        stacked = report.stacked_rows,
        missing_provider = report.missing_provider,
        rows = report.final_rows,
        "aggregation complete"
    );
    Ok(UnifiedTable { frame, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use di_ingest::{CellValue, SheetGrid};
    use polars::prelude::{AnyValue, DataType};

    fn cleaned_grid(name: &str, rows: &[(&str, &str, &str)]) -> SheetGrid {
        let mut cells = vec![vec![
            CellValue::text("Region"),
            CellValue::text("Org Code"),
            CellValue::text("Provider Name"),
            CellValue::text("CT"),
        ]];
        for (code, provider, ct) in rows {
            cells.push(vec![
                CellValue::text("South West"),
                CellValue::text(*code),
                CellValue::text(*provider),
                CellValue::text(*ct),
            ]);
        }
        SheetGrid::new(name, cells)
    }

    fn cleaned(name: &str, month: u32) -> CleanedSheet {
        CleanedSheet {
            name: name.to_string(),
            period: NaiveDate::from_ymd_opt(2018, month, 1).unwrap(),
        }
    }

    fn workbook() -> Workbook {
        Workbook {
            path: "tables.xlsx".into(),
            sheets: vec![
                cleaned_grid(
                    "April 2018",
                    &[("RBD", "Dorset County", "120"), ("RD1", "Royal United", "N/A")],
                ),
                cleaned_grid(
                    "May 2018",
                    &[("RBD", "Dorset County", "130"), ("ABC123", "", "5")],
                ),
            ],
        }
    }

    #[test]
    fn test_build_without_lookup() {
        let sheets = [cleaned("April 2018", 4), cleaned("May 2018", 5)];
        let unified =
            build_unified_table(&workbook(), &sheets, &PipelineConfig::default(), None).unwrap();

        assert_eq!(unified.report.stacked_rows, 4);
        assert_eq!(unified.report.missing_provider, 1);
        assert_eq!(unified.report.final_rows, 3);
        assert!(unified.report.join.is_none());

        let ct = unified.frame.column("CT").unwrap();
        assert_eq!(ct.dtype(), &DataType::Float64);
        assert_eq!(ct.get(1).unwrap(), AnyValue::Null);
        let period = unified.frame.column("Period").unwrap();
        assert_eq!(period.null_count(), 0);
    }

    #[test]
    fn test_build_with_lookup() {
        let sheets = [cleaned("April 2018", 4), cleaned("May 2018", 5)];
        let lookup = RegionLookup::from_pairs([("RBD", "Dorset")]);
        let unified = build_unified_table(
            &workbook(),
            &sheets,
            &PipelineConfig::default(),
            Some(&lookup),
        )
        .unwrap();

        let join = unified.report.join.as_ref().unwrap();
        assert_eq!(join.matched, 2);
        assert_eq!(join.dropped, 1);
        assert!(join.unmatched_codes.contains("RD1"));
        assert_eq!(unified.frame.height(), 2);
    }

    #[test]
    fn test_unknown_sheet() {
        let sheets = [cleaned("June 2018", 6)];
        let err =
            build_unified_table(&workbook(), &sheets, &PipelineConfig::default(), None).unwrap_err();
        assert!(matches!(err, TransformError::UnknownSheet { .. }));
    }
}
