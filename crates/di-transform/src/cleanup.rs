//! Row filtering and metric coercion on the stacked table.

use di_common::parse_f64;
use di_model::{PERIOD_COLUMN, SchemaMismatch};
use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;

/// How many non-blank cells of one metric column could not be read as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnCoercion {
    pub column: String,
    pub nulled: usize,
}

/// Removes rows whose provider name is null or blank.
///
/// Returns the filtered frame and the number of rows removed.
pub fn drop_missing_provider(df: &DataFrame, provider_column: &str) -> Result<(DataFrame, usize)> {
    let column = df
        .column(provider_column)
        .map_err(|_| SchemaMismatch::MissingColumn {
            column: provider_column.to_string(),
        })?;
    let strings = column.cast(&DataType::String)?;
    let keep: Vec<bool> = strings
        .str()?
        .into_iter()
        .map(|value| value.is_some_and(|text| !text.trim().is_empty()))
        .collect();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let filtered = df.filter(&mask)?;
    let dropped = df.height() - filtered.height();
    if dropped > 0 {
        tracing::debug!(dropped, column = provider_column, "dropped rows without a provider");
    }
    Ok((filtered, dropped))
}

/// Names of the data columns, in order, excluding `Period`.
pub fn data_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != PERIOD_COLUMN)
        .map(ToString::to_string)
        .collect()
}

/// Resolves the metric column range to column names.
///
/// `start` and `end` are 0-based positions over the data columns; `end` is
/// exclusive and defaults to the last data column.
pub fn metric_columns(df: &DataFrame, start: usize, end: Option<usize>) -> Result<Vec<String>> {
    let columns = data_columns(df);
    let width = columns.len();
    let end = end.unwrap_or(width);
    if start > end || end > width {
        return Err(SchemaMismatch::MetricRangeOutOfBounds { start, end, width }.into());
    }
    Ok(columns[start..end].to_vec())
}

/// Casts the metric column range to `Float64`.
///
/// Text that does not parse (such as `N/A` or `*`) becomes null; thousands
/// separators are accepted. Returns the number of nulled cells per column.
pub fn coerce_metrics(
    mut df: DataFrame,
    start: usize,
    end: Option<usize>,
) -> Result<(DataFrame, Vec<ColumnCoercion>)> {
    let names = metric_columns(&df, start, end)?;
    let mut report = Vec::with_capacity(names.len());
    for name in names {
        let strings = df.column(&name)?.cast(&DataType::String)?;
        let mut nulled = 0usize;
        let parsed: Vec<Option<f64>> = strings
            .str()?
            .into_iter()
            .map(|value| match value {
                Some(text) if !text.trim().is_empty() => {
                    let number = parse_f64(text);
                    if number.is_none() {
                        nulled += 1;
                    }
                    number
                }
                _ => None,
            })
            .collect();
        let values = Series::new(name.as_str().into(), parsed);
        df.with_column(values)?;
        if nulled > 0 {
            tracing::debug!(column = %name, nulled, "non-numeric metric values set to null");
        }
        report.push(ColumnCoercion {
            column: name,
            nulled,
        });
    }
    Ok((df, report))
}
