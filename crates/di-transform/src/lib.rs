//! Aggregation of cleaned diagnostic-imaging sheets.
//!
//! Builds the unified table: one frame per cleaned sheet tagged with its
//! `Period`, stacked over the union of columns, filtered to rows with a
//! provider, with the metric range cast to numbers and an optional inner
//! join against the region lookup.
//!
//! # Example
//!
//! ```ignore
//! use di_transform::build_unified_table;
//!
//! let unified = build_unified_table(&workbook, &report.cleaned, &config, Some(&lookup))?;
//! println!("{} rows", unified.frame.height());
//! ```

mod cleanup;
mod error;
mod frame;
mod join;
mod unify;

// Error type
pub use error::{Result, TransformError};

// Frame building
pub use frame::{attach_period, sheet_to_frame, stack_frames};

// Row and column cleanup
pub use cleanup::{ColumnCoercion, coerce_metrics, data_columns, drop_missing_provider, metric_columns};

// Region join
pub use join::{JoinReport, join_regions};

// Full aggregation
pub use unify::{AggregateReport, UnifiedTable, build_unified_table};
