//! Per-sheet frames and diagonal stacking.

use chrono::NaiveDate;
use di_common::days_since_epoch;
use di_ingest::SheetTable;
use di_model::PERIOD_COLUMN;
use polars::prelude::*;

use crate::error::{Result, TransformError};

/// Converts a cleaned sheet table into a frame of `String` columns.
pub fn sheet_to_frame(table: &SheetTable) -> Result<DataFrame> {
    Ok(table.to_string_frame()?)
}

/// Appends the `Period` date column, or overwrites it when already present.
pub fn attach_period(mut df: DataFrame, period: NaiveDate) -> Result<DataFrame> {
    let days = vec![days_since_epoch(period); df.height()];
    let column = Series::new(PERIOD_COLUMN.into(), days).cast(&DataType::Date)?;
    df.with_column(column)?;
    Ok(df)
}

/// Stacks frames vertically over the union of their columns.
///
/// Columns keep first-seen order. A column missing from one frame is null for
/// that frame's rows. When the same column carries different types the later
/// frames are cast to the first type seen.
pub fn stack_frames(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let mut schema: Vec<(PlSmallStr, DataType)> = Vec::new();
    for frame in &frames {
        for column in frame.get_columns() {
            if !schema.iter().any(|(name, _)| name == column.name()) {
                schema.push((column.name().clone(), column.dtype().clone()));
            }
        }
    }

    let mut stacked: Option<DataFrame> = None;
    for frame in frames {
        let height = frame.height();
        let mut columns = Vec::with_capacity(schema.len());
        for (name, dtype) in &schema {
            let column = match frame.column(name.as_str()) {
                Ok(existing) if existing.dtype() == dtype => existing.clone(),
                Ok(existing) => existing.cast(dtype)?,
                Err(_) => Column::full_null(name.clone(), height, dtype),
            };
            columns.push(column);
        }
        let aligned = DataFrame::new(columns)?;
        match stacked.as_mut() {
            Some(acc) => {
                acc.vstack_mut(&aligned)?;
            }
            None => stacked = Some(aligned),
        }
    }

    stacked.ok_or(TransformError::NoSheets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: &[(&str, &[&str])]) -> DataFrame {
        let columns = columns
            .iter()
            .map(|(name, values)| Series::new((*name).into(), values.to_vec()).into())
            .collect::<Vec<Column>>();
        DataFrame::new(columns).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_attach_period_tags_every_row() {
        let df = frame(&[("Org Code", &["RBD", "RD1"])]);
        let df = attach_period(df, date(2018, 4, 1)).unwrap();
        let period = df.column(PERIOD_COLUMN).unwrap();
        assert_eq!(period.dtype(), &DataType::Date);
        assert_eq!(period.null_count(), 0);
        assert_eq!(period.get(1).unwrap(), AnyValue::Date(17622));
    }

    #[test]
    fn test_stack_counts_rows() {
        let a = frame(&[("Org Code", &["A", "B", "C", "D", "E"])]);
        let b = frame(&[("Org Code", &["F", "G", "H", "I", "J", "K", "L"])]);
        let stacked = stack_frames(vec![a, b]).unwrap();
        assert_eq!(stacked.height(), 12);
    }

    #[test]
    fn test_stack_is_diagonal() {
        let a = frame(&[("Org Code", &["A"]), ("CT", &["1"])]);
        let b = frame(&[("Org Code", &["B"]), ("MRI", &["2"])]);
        let stacked = stack_frames(vec![a, b]).unwrap();

        let names: Vec<&str> = stacked
            .get_column_names()
            .into_iter()
            .map(PlSmallStr::as_str)
            .collect();
        assert_eq!(names, vec!["Org Code", "CT", "MRI"]);
        assert_eq!(stacked.column("CT").unwrap().null_count(), 1);
        assert_eq!(stacked.column("MRI").unwrap().get(0).unwrap(), AnyValue::Null);
    }

    #[test]
    fn test_stack_nothing_is_an_error() {
        assert!(matches!(stack_frames(Vec::new()), Err(TransformError::NoSheets)));
    }
}
