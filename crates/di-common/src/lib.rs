//! Shared utilities for the diagnostic-imaging crates.
//!
//! Polars `AnyValue` conversions and the day-count helpers used to move
//! report periods in and out of `Date` columns.

pub mod dates;
pub mod polars;

pub use dates::{date_from_days, days_since_epoch, parse_period_text};
pub use self::polars::{
    any_to_date, any_to_f64, any_to_string, any_to_string_non_empty, format_numeric, parse_f64,
};
