//! Pipeline configuration loaded from TOML.
//!
//! Defaults reproduce the layout of the published NHS diagnostic-imaging
//! provider tables, so running without a config file needs no setup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::enums::{MetricKind, Modality};
use crate::error::{ModelError, Result};
use crate::layout::SheetLayout;

/// Column roles in the cleaned data sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Provider name; rows without one are dropped.
    pub provider: String,
    /// Organisation code used as the region join key.
    pub org_code: String,
    /// First metric column, 0-based over the cleaned data columns.
    pub metric_start: usize,
    /// One past the last metric column. `None` runs to the last data column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_end: Option<usize>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            provider: "Provider Name".to_string(),
            org_code: "Org Code".to_string(),
            metric_start: 3,
            metric_end: None,
        }
    }
}

/// Columns of the organisation-to-region lookup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub code_column: String,
    /// Region label column; also the name given to the joined column.
    pub region_column: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            code_column: "Org Code".to_string(),
            region_column: "STP".to_string(),
        }
    }
}

/// One charted metric and the unified-table column it is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricColumn {
    pub modality: Modality,
    pub kind: MetricKind,
    pub column: String,
}

impl MetricColumn {
    pub fn new(modality: Modality, kind: MetricKind, column: impl Into<String>) -> Self {
        Self {
            modality,
            kind,
            column: column.into(),
        }
    }

    /// Display label such as `CT Waiting List`.
    pub fn label(&self) -> String {
        format!("{} {}", self.modality, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub region_column: String,
    pub default_region: String,
    pub default_window: usize,
    pub metrics: Vec<MetricColumn>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            region_column: "STP".to_string(),
            default_region: "Bath, Swindon and Wiltshire".to_string(),
            default_window: 3,
            metrics: vec![
                MetricColumn::new(Modality::Ct, MetricKind::Activity, "CT Activity"),
                MetricColumn::new(Modality::Mri, MetricKind::Activity, "MRI Activity"),
                MetricColumn::new(Modality::Ct, MetricKind::WaitingList, "CT Waiting List"),
                MetricColumn::new(Modality::Mri, MetricKind::WaitingList, "MRI Waiting List"),
            ],
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of leading title sheets to skip.
    pub skip_leading_sheets: usize,
    pub layout: SheetLayout,
    pub columns: ColumnConfig,
    pub lookup: LookupConfig,
    pub dashboard: DashboardConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            skip_leading_sheets: 1,
            layout: SheetLayout::default(),
            columns: ColumnConfig::default(),
            lookup: LookupConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        if let Some(end) = self.columns.metric_end
            && end < self.columns.metric_start
        {
            return Err(ModelError::InvalidConfig {
                message: format!(
                    "metric_end ({end}) is before metric_start ({})",
                    self.columns.metric_start
                ),
            });
        }
        if self.dashboard.default_window == 0 {
            return Err(ModelError::InvalidConfig {
                message: "dashboard.default_window must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Renders the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Loads and validates a TOML configuration file.
///
/// Keys missing from the file keep their default values.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: PipelineConfig =
        toml::from_str(&contents).map_err(|source| ModelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}
