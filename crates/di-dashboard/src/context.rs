//! In-memory dashboard dataset.
//!
//! The unified table is read once and summed per region and period. Chart
//! handlers only ever see this immutable context.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use di_common::{any_to_date, any_to_f64, any_to_string_non_empty};
use di_ingest::read_unified_table;
use di_model::{DashboardConfig, MetricColumn, MetricKind, Modality, PERIOD_COLUMN};
use polars::prelude::DataFrame;

use crate::error::{DashboardError, Result};

/// Metric totals for one region, ordered by period.
///
/// Each entry holds one total per configured metric, in configuration order.
pub type RegionSeries = BTreeMap<NaiveDate, Vec<f64>>;

/// Per-region, per-period metric totals plus dashboard defaults.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    metrics: Vec<MetricColumn>,
    regions: BTreeMap<String, RegionSeries>,
    pub default_region: String,
    pub default_window: usize,
}

impl DashboardContext {
    /// Reads a persisted unified table and aggregates it.
    pub fn load(path: &Path, config: &DashboardConfig) -> Result<Self> {
        let df = read_unified_table(path)?;
        Self::from_frame(&df, config)
    }

    /// Sums every configured metric per `(region, period)`.
    ///
    /// Null metric values count as zero. Rows without a region or a period
    /// are left out.
    pub fn from_frame(df: &DataFrame, config: &DashboardConfig) -> Result<Self> {
        let column = |name: &str| {
            df.column(name).map_err(|_| DashboardError::MissingColumn {
                column: name.to_string(),
            })
        };
        let regions_col = column(&config.region_column)?;
        let periods_col = column(PERIOD_COLUMN)?;
        let metric_cols = config
            .metrics
            .iter()
            .map(|metric| column(&metric.column))
            .collect::<Result<Vec<_>>>()?;

        let mut regions: BTreeMap<String, RegionSeries> = BTreeMap::new();
        let mut skipped = 0usize;
        for idx in 0..df.height() {
            let region = regions_col.get(idx).ok().and_then(any_to_string_non_empty);
            let period = periods_col.get(idx).ok().and_then(any_to_date);
            let (Some(region), Some(period)) = (region, period) else {
                skipped += 1;
                continue;
            };
            let totals = regions
                .entry(region)
                .or_default()
                .entry(period)
                .or_insert_with(|| vec![0.0; metric_cols.len()]);
            for (total, metric) in totals.iter_mut().zip(&metric_cols) {
                *total += metric.get(idx).ok().and_then(any_to_f64).unwrap_or(0.0);
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "rows without a region or period left out");
        }
        tracing::info!(regions = regions.len(), "dashboard context ready");

        Ok(Self {
            metrics: config.metrics.clone(),
            regions,
            default_region: config.default_region.clone(),
            default_window: config.default_window.max(1),
        })
    }

    /// Region labels in sorted order.
    pub fn regions(&self) -> Vec<&str> {
        self.regions.keys().map(String::as_str).collect()
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.regions.contains_key(region)
    }

    /// The configured metric for a modality and kind.
    pub fn metric(&self, modality: Modality, kind: MetricKind) -> Result<&MetricColumn> {
        self.metrics
            .iter()
            .find(|metric| metric.modality == modality && metric.kind == kind)
            .ok_or_else(|| DashboardError::MissingMetric {
                modality: modality.to_string(),
                kind: kind.to_string(),
            })
    }

    fn metric_index(&self, modality: Modality, kind: MetricKind) -> Result<usize> {
        self.metrics
            .iter()
            .position(|metric| metric.modality == modality && metric.kind == kind)
            .ok_or_else(|| DashboardError::MissingMetric {
                modality: modality.to_string(),
                kind: kind.to_string(),
            })
    }

    /// Periods and totals of one metric for one region, in period order.
    ///
    /// An unknown region yields empty vectors.
    pub fn series(
        &self,
        region: &str,
        modality: Modality,
        kind: MetricKind,
    ) -> Result<(Vec<NaiveDate>, Vec<f64>)> {
        let index = self.metric_index(modality, kind)?;
        let Some(series) = self.regions.get(region) else {
            return Ok((Vec::new(), Vec::new()));
        };
        Ok(series
            .iter()
            .map(|(period, totals)| (*period, totals[index]))
            .unzip())
    }
}
