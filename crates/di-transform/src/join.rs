//! Inner join of the unified table against the region lookup.

use std::collections::BTreeSet;

use di_ingest::RegionLookup;
use di_model::SchemaMismatch;
use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;

/// Outcome of the region join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    /// Rows that found a region.
    pub matched: usize,
    /// Rows removed because their code is not in the lookup.
    pub dropped: usize,
    /// Distinct non-blank codes that had no region, sorted.
    pub unmatched_codes: BTreeSet<String>,
}

/// Keeps rows whose org code is in the lookup and adds the region column.
///
/// Row order is preserved. An existing column named `region_column` is
/// replaced by the looked-up labels.
pub fn join_regions(
    df: &DataFrame,
    lookup: &RegionLookup,
    code_column: &str,
    region_column: &str,
) -> Result<(DataFrame, JoinReport)> {
    let codes = df
        .column(code_column)
        .map_err(|_| SchemaMismatch::MissingColumn {
            column: code_column.to_string(),
        })?
        .cast(&DataType::String)?;

    let mut keep = Vec::with_capacity(df.height());
    let mut regions = Vec::with_capacity(df.height());
    let mut report = JoinReport::default();
    for code in codes.str()?.into_iter() {
        match code.and_then(|code| lookup.region_for(code)) {
            Some(region) => {
                keep.push(true);
                regions.push(region.to_string());
                report.matched += 1;
            }
            None => {
                keep.push(false);
                report.dropped += 1;
                if let Some(code) = code.map(str::trim).filter(|code| !code.is_empty()) {
                    report.unmatched_codes.insert(code.to_string());
                }
            }
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let mut joined = df.filter(&mask)?;
    joined.with_column(Series::new(region_column.into(), regions))?;

    if report.dropped > 0 {
        tracing::warn!(
            dropped = report.dropped,
            unmatched = report.unmatched_codes.len(),
            "rows without a region were dropped by the join"
        );
    }
    Ok((joined, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "Org Code" => [Some("RBD"), Some("ABC123"), Some("RD1"), None, Some("ABC123")],
            "CT" => [1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .unwrap()
    }

    fn lookup() -> RegionLookup {
        RegionLookup::from_pairs([("RBD", "Dorset"), ("RD1", "Bath, Swindon and Wiltshire")])
    }

    #[test]
    fn test_join_is_inner_and_reported() {
        let (df, report) = join_regions(&sample(), &lookup(), "Org Code", "STP").unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(report.matched, 2);
        assert_eq!(report.dropped, 3);
        assert_eq!(
            report.unmatched_codes.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["ABC123"]
        );
        let stp = df.column("STP").unwrap();
        assert_eq!(stp.get(1).unwrap(), AnyValue::String("Bath, Swindon and Wiltshire"));
    }

    #[test]
    fn test_join_requires_code_column() {
        let err = join_regions(&sample(), &lookup(), "Code", "STP").unwrap_err();
        assert!(matches!(
            err,
            crate::error::TransformError::Schema(SchemaMismatch::MissingColumn { .. })
        ));
    }
}
