//! In-memory sheet grid with spreadsheet-style row and column deletion.
//!
//! Coordinates in the public API are 1-based, as in the layout descriptor.
//! The grid is always rectangular; deleting rows or columns shifts everything
//! after them up or left, and merged regions move with their cells.

use chrono::NaiveDateTime;
use di_common::format_numeric;
use di_model::{CellRange, CellRef};

/// A typed cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
    /// Spreadsheet error such as `#N/A`.
    Error(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Renders the value the way it appears in the unified table.
    ///
    /// Blank cells and spreadsheet errors render as `None`.
    pub fn render(&self) -> Option<String> {
        match self {
            CellValue::Empty | CellValue::Error(_) => None,
            CellValue::Text(text) => {
                let trimmed = text.trim().trim_matches('\u{feff}');
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(value) => Some(format_numeric(*value)),
            CellValue::Bool(value) => Some(value.to_string()),
            CellValue::Date(value) => {
                if value.time() == chrono::NaiveTime::MIN {
                    Some(value.format("%Y-%m-%d").to_string())
                } else {
                    Some(value.format("%Y-%m-%d %H:%M:%S").to_string())
                }
            }
        }
    }

    /// Short description used in mismatch messages.
    pub fn describe(&self) -> String {
        match self {
            CellValue::Empty => "an empty cell".to_string(),
            CellValue::Text(text) => format!("text '{text}'"),
            CellValue::Number(value) => format!("number {}", format_numeric(*value)),
            CellValue::Bool(value) => format!("boolean {value}"),
            CellValue::Date(value) => format!("date {value}"),
            CellValue::Error(code) => format!("error {code}"),
        }
    }
}

/// One worksheet: a rectangular grid of cells plus its merged regions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetGrid {
    pub name: String,
    rows: Vec<Vec<CellValue>>,
    merged: Vec<CellRange>,
}

impl SheetGrid {
    /// Creates a grid from row vectors, padding short rows with empty cells.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self {
            name: name.into(),
            rows,
            merged: Vec::new(),
        }
    }

    pub fn with_merged(mut self, merged: Vec<CellRange>) -> Self {
        self.merged = merged;
        self
    }

    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn width(&self) -> u32 {
        self.rows.first().map_or(0, |row| row.len() as u32)
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged
    }

    pub fn is_merged(&self, range: CellRange) -> bool {
        self.merged.contains(&range)
    }

    /// Value at a cell; cells outside the grid read as empty.
    pub fn get(&self, cell: CellRef) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        if cell.row == 0 || cell.col == 0 {
            return EMPTY;
        }
        let (row, col) = cell.zero_based();
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(EMPTY)
    }

    /// Writes a cell, growing the grid when needed.
    pub fn set(&mut self, cell: CellRef, value: CellValue) {
        if cell.row == 0 || cell.col == 0 {
            return;
        }
        let (row, col) = cell.zero_based();
        let width = self.width() as usize;
        if col >= width {
            for cells in &mut self.rows {
                cells.resize(col + 1, CellValue::Empty);
            }
        }
        let width = width.max(col + 1);
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, || vec![CellValue::Empty; width]);
        }
        self.rows[row][col] = value;
    }

    /// Removes a merge relation. Cell contents are untouched.
    ///
    /// Returns `false` when the range was not merged.
    pub fn unmerge(&mut self, range: CellRange) -> bool {
        let before = self.merged.len();
        self.merged.retain(|existing| *existing != range);
        self.merged.len() != before
    }

    /// Deletes `count` rows starting at 1-based `start`, shifting later rows up.
    pub fn delete_rows(&mut self, start: u32, count: u32) {
        if start == 0 || count == 0 || start > self.height() {
            return;
        }
        let from = (start - 1) as usize;
        let to = (from + count as usize).min(self.rows.len());
        self.rows.drain(from..to);
        let mut shifted = Vec::with_capacity(self.merged.len());
        for range in &self.merged {
            if let Some((first, last)) = shift_span(range.start.row, range.end.row, start, count) {
                shifted.push(CellRange::new(
                    CellRef::new(first, range.start.col),
                    CellRef::new(last, range.end.col),
                ));
            }
        }
        self.merged = shifted;
        self.drop_degenerate_merges();
    }

    /// Deletes `count` columns starting at 1-based `start`, shifting later columns left.
    pub fn delete_cols(&mut self, start: u32, count: u32) {
        if start == 0 || count == 0 || start > self.width() {
            return;
        }
        let from = (start - 1) as usize;
        for cells in &mut self.rows {
            let to = (from + count as usize).min(cells.len());
            cells.drain(from..to);
        }
        let mut shifted = Vec::with_capacity(self.merged.len());
        for range in &self.merged {
            if let Some((first, last)) = shift_span(range.start.col, range.end.col, start, count) {
                shifted.push(CellRange::new(
                    CellRef::new(range.start.row, first),
                    CellRef::new(range.end.row, last),
                ));
            }
        }
        self.merged = shifted;
        self.drop_degenerate_merges();
    }

    fn drop_degenerate_merges(&mut self) {
        self.merged
            .retain(|range| range.height() > 1 || range.width() > 1);
    }
}

/// Shifts an inclusive `[first, last]` span for a deletion of `count` items
/// starting at `start`. Returns `None` when the whole span is deleted.
fn shift_span(first: u32, last: u32, start: u32, count: u32) -> Option<(u32, u32)> {
    let end = start + count - 1;
    let shift = |index: u32| -> Option<u32> {
        if index < start {
            Some(index)
        } else if index > end {
            Some(index - count)
        } else {
            None
        }
    };
    match (shift(first), shift(last)) {
        (Some(a), Some(b)) => Some((a, b)),
        // Span starts inside the deleted block: it now begins where the block was.
        (None, Some(b)) => Some((start, b)),
        // Span ends inside the deleted block: it now ends just before it.
        (Some(a), None) => Some((a, start - 1)),
        (None, None) => None,
    }
}
