//! Declarative description of the fixed sheet layout.
//!
//! Every published data sheet shares one shape: a report date at a known cell,
//! two merged title blocks, a header block above the column headers, a gap
//! block below them and an empty spacer column on the left. The cleaner checks
//! a sheet against this descriptor before deleting anything.

use serde::{Deserialize, Serialize};

use crate::cell::{CellRange, CellRef};
use crate::error::ModelError;

/// A block of rows to delete, 1-based and counted from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpan {
    pub start: u32,
    pub count: u32,
}

impl RowSpan {
    pub fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }

    /// Last row covered by the span (inclusive), saturating at `u32::MAX`.
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.count.saturating_sub(1))
    }

    /// Last row covered by the span, or `None` when it overflows `u32`.
    pub fn checked_end(&self) -> Option<u32> {
        self.start.checked_add(self.count.saturating_sub(1))
    }
}

/// A block of columns to delete, 1-based and counted from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpan {
    pub start: u32,
    pub count: u32,
}

impl ColumnSpan {
    pub fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }

    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.count.saturating_sub(1))
    }

    pub fn checked_end(&self) -> Option<u32> {
        self.start.checked_add(self.count.saturating_sub(1))
    }
}

/// Fixed layout of one data sheet, in raw (uncleaned) coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// Cell holding the reporting period.
    pub date_cell: CellRef,
    /// Row holding the column headers.
    pub header_row: u32,
    /// Header labels that must appear in `header_row`.
    pub required_headers: Vec<String>,
    /// Merged title regions removed before any row deletion.
    pub merged_titles: Vec<CellRange>,
    /// Leading spacer column(s), deleted last.
    pub spacer_columns: ColumnSpan,
    /// Row blocks deleted in the listed order. Later entries are expressed
    /// in the coordinates left behind by earlier ones.
    pub row_deletions: Vec<RowSpan>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            date_cell: CellRef::new(5, 3),
            header_row: 14,
            required_headers: vec!["Org Code".to_string(), "Provider Name".to_string()],
            merged_titles: vec![
                CellRange::new(CellRef::new(2, 3), CellRef::new(2, 6)),
                CellRange::new(CellRef::new(3, 3), CellRef::new(4, 6)),
            ],
            spacer_columns: ColumnSpan::new(1, 1),
            row_deletions: vec![RowSpan::new(15, 16), RowSpan::new(1, 13)],
        }
    }
}

impl SheetLayout {
    /// Maps a raw row through the row deletions.
    ///
    /// Returns `None` when the row itself is deleted.
    pub fn map_row(&self, raw_row: u32) -> Option<u32> {
        let mut row = raw_row;
        for span in &self.row_deletions {
            if span.count == 0 {
                continue;
            }
            if row >= span.start && row <= span.end() {
                return None;
            }
            if row > span.end() {
                row -= span.count;
            }
        }
        Some(row)
    }

    /// Checks the descriptor is internally consistent.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.row_deletions.iter().any(|span| span.start == 0) {
            return Err(ModelError::InvalidConfig {
                message: "row deletions are 1-based; start must be at least 1".to_string(),
            });
        }
        if self.spacer_columns.start == 0 {
            return Err(ModelError::InvalidConfig {
                message: "spacer columns are 1-based; start must be at least 1".to_string(),
            });
        }
        if let Some(span) = self
            .row_deletions
            .iter()
            .find(|span| span.checked_end().is_none())
        {
            return Err(ModelError::InvalidConfig {
                message: format!(
                    "row deletion starting at {} with count {} runs past the last row",
                    span.start, span.count
                ),
            });
        }
        if self.spacer_columns.checked_end().is_none() {
            return Err(ModelError::InvalidConfig {
                message: format!(
                    "spacer columns starting at {} with count {} run past the last column",
                    self.spacer_columns.start, self.spacer_columns.count
                ),
            });
        }
        match self.map_row(self.header_row) {
            Some(1) => Ok(()),
            Some(row) => Err(ModelError::InvalidConfig {
                message: format!(
                    "header row {} lands on row {row} after cleaning; it must become row 1",
                    self.header_row
                ),
            }),
            None => Err(ModelError::InvalidConfig {
                message: format!("header row {} is removed by a row deletion", self.header_row),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflowing_spans_are_rejected() {
        let mut layout = SheetLayout::default();
        layout.row_deletions.push(RowSpan::new(u32::MAX, 2));
        assert!(matches!(layout.validate(), Err(ModelError::InvalidConfig { .. })));
        assert_eq!(RowSpan::new(u32::MAX, 2).end(), u32::MAX);

        let mut layout = SheetLayout::default();
        layout.spacer_columns = ColumnSpan::new(u32::MAX, 3);
        assert!(matches!(layout.validate(), Err(ModelError::InvalidConfig { .. })));
    }

    #[test]
    fn default_layout_is_consistent() {
        let layout = SheetLayout::default();
        layout.validate().unwrap();
        assert_eq!(layout.map_row(14), Some(1));
        assert_eq!(layout.map_row(31), Some(2));
        assert_eq!(layout.map_row(20), None);
        assert_eq!(layout.map_row(3), None);
    }

    #[test]
    fn header_that_is_deleted_is_rejected() {
        let layout = SheetLayout {
            header_row: 15,
            ..SheetLayout::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn header_that_is_not_first_is_rejected() {
        let layout = SheetLayout {
            header_row: 31,
            ..SheetLayout::default()
        };
        assert!(layout.validate().is_err());
    }
}
