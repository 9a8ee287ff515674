//! Header-plus-rows view of a cleaned sheet.

use std::collections::BTreeMap;

use polars::prelude::*;

use crate::grid::SheetGrid;

/// A rectangular string table: one header per column and rendered cell text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SheetTable {
    /// Reads a cleaned grid: row 1 is the header, every following row with at
    /// least one non-blank cell is data.
    pub fn from_grid(grid: &SheetGrid) -> Self {
        let mut rows = grid.rows().iter();
        let Some(header_cells) = rows.next() else {
            return Self::default();
        };
        let raw_headers: Vec<String> = header_cells
            .iter()
            .map(|cell| cell.render().unwrap_or_default())
            .collect();
        let headers = normalize_headers(&raw_headers);

        let rows = rows
            .map(|cells| cells.iter().map(crate::grid::CellValue::render).collect::<Vec<_>>())
            .filter(|cells| cells.iter().any(Option::is_some))
            .collect();

        Self { headers, rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Values of one column, top to bottom.
    pub fn column_values(&self, index: usize) -> Vec<Option<String>> {
        self.rows
            .iter()
            .map(|row| row.get(index).cloned().flatten())
            .collect()
    }

    /// Converts the table into a DataFrame of `String` columns.
    pub fn to_string_frame(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                Series::new(header.as_str().into(), self.column_values(index)).into()
            })
            .collect::<Vec<Column>>();
        DataFrame::new(columns)
    }
}

/// Normalizes a header value: trims, collapses internal whitespace and drops a BOM.
pub fn normalize_header(value: &str) -> String {
    value
        .trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a header row so every column has a unique, non-empty name.
///
/// Blank headers become `Unnamed: N` (0-based position); repeated names get
/// `.1`, `.2` suffixes in order of appearance.
pub fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut headers = Vec::with_capacity(raw.len());
    for (index, value) in raw.iter().enumerate() {
        let mut name = normalize_header(value);
        if name.is_empty() {
            name = format!("Unnamed: {index}");
        }
        let count = seen.entry(name.clone()).or_insert(0);
        let unique = if *count == 0 {
            name.clone()
        } else {
            format!("{name}.{count}")
        };
        *count += 1;
        headers.push(unique);
    }
    headers
}
