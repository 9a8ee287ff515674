//! Diagnostic-imaging workbook ingestion.
//!
//! This crate loads published provider-count workbooks, cleans each data sheet
//! against the fixed layout, and reads the auxiliary region lookup and the
//! persisted unified table.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use di_ingest::{SheetTable, clean_workbook, load_workbook};
//! use di_model::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! let mut workbook = load_workbook(Path::new("data/tables.xlsx"))?;
//! let report = clean_workbook(&mut workbook, &config.layout, config.skip_leading_sheets);
//! for sheet in &report.cleaned {
//!     let table = SheetTable::from_grid(workbook.sheet(&sheet.name).unwrap());
//!     println!("{} {}: {} rows", sheet.name, sheet.period, table.height());
//! }
//! ```

mod clean;
mod error;
mod grid;
mod lookup;
mod table;
mod unified;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === Sheet Grid ===
pub use grid::{CellValue, SheetGrid};

// === Workbook Loading ===
pub use workbook::{Workbook, load_workbook};

// === Cleaning ===
pub use clean::{
    CleanReport, CleanedSheet, SkippedSheet, clean_sheet, clean_workbook, read_period,
    validate_sheet,
};

// === Tables ===
pub use table::{SheetTable, normalize_header, normalize_headers};

// === Lookup and Unified Table ===
pub use lookup::{RegionLookup, load_region_lookup};
pub use unified::{infer_column_types, read_unified_table};
