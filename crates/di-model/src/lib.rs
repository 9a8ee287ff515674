//! Data model for the diagnostic-imaging workbook pipeline.
//!
//! Holds the types shared by every stage: cell coordinates, the declarative
//! sheet layout descriptor, pipeline configuration, metric enums and the
//! structured `SchemaMismatch` error raised when a sheet does not match its
//! layout.

pub mod cell;
pub mod config;
pub mod enums;
pub mod error;
pub mod layout;

pub use cell::{CellRange, CellRef};
pub use config::{
    ColumnConfig, DashboardConfig, LookupConfig, MetricColumn, PipelineConfig, load_config,
};
pub use enums::{MetricKind, Modality, OutputFormat};
pub use error::{ModelError, Result, SchemaMismatch};
pub use layout::{ColumnSpan, RowSpan, SheetLayout};

/// Name of the column injected into every row with the sheet's reporting period.
pub const PERIOD_COLUMN: &str = "Period";
