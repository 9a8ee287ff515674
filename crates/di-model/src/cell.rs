//! A1-style cell coordinates.
//!
//! Rows and columns are 1-based, matching the way spreadsheet users read them
//! (`C5` is row 5, column 3).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A single cell address such as `C5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellRef {
    /// 1-based row index.
    pub row: u32,
    /// 1-based column index.
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Zero-based `(row, col)` pair for indexing into a grid.
    pub fn zero_based(self) -> (usize, usize) {
        (
            self.row.saturating_sub(1) as usize,
            self.col.saturating_sub(1) as usize,
        )
    }
}

/// Converts a 1-based column index into its letter form (`1` -> `A`, `27` -> `AA`).
pub fn column_letters(col: u32) -> String {
    let mut letters = Vec::new();
    let mut remaining = col;
    while remaining > 0 {
        let rem = (remaining - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn parse_column_letters(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for ch in letters.chars() {
        let upper = ch.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(u32::from(upper as u8 - b'A') + 1)?;
    }
    Some(col)
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row)
    }
}

impl FromStr for CellRef {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('$');
        let split = trimmed
            .find(|ch: char| ch.is_ascii_digit() || ch == '$')
            .ok_or_else(|| ModelError::InvalidCellRef {
                value: s.to_string(),
            })?;
        let (letters, digits) = trimmed.split_at(split);
        let col = parse_column_letters(letters);
        let row = digits.trim_start_matches('$').parse::<u32>().ok();
        match (row, col) {
            (Some(row), Some(col)) if row > 0 => Ok(Self { row, col }),
            _ => Err(ModelError::InvalidCellRef {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for CellRef {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellRef> for String {
    fn from(value: CellRef) -> Self {
        value.to_string()
    }
}

/// A rectangular cell range such as `C2:F2`, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    /// Builds a range, normalising the corners so `start` is top-left.
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            start: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    pub fn width(&self) -> u32 {
        self.end.col - self.start.col + 1
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for CellRange {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (left, right) = s.split_once(':').ok_or_else(|| ModelError::InvalidRange {
            value: s.to_string(),
        })?;
        let start: CellRef = left.parse().map_err(|_| ModelError::InvalidRange {
            value: s.to_string(),
        })?;
        let end: CellRef = right.parse().map_err(|_| ModelError::InvalidRange {
            value: s.to_string(),
        })?;
        Ok(Self::new(start, end))
    }
}

impl TryFrom<String> for CellRange {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellRange> for String {
    fn from(value: CellRange) -> Self {
        value.to_string()
    }
}
