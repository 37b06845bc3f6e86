// src/services/tokenizer.rs

//! Splits one markdown table row into cells.

/// Column separator of the listing tables.
pub const COLUMN_SEPARATOR: char = '|';

/// Fewest cells any row layout can be parsed from.
pub const MIN_ROW_CELLS: usize = 4;

/// Trimmed, non-empty cells of one table row, in order.
///
/// Empty cells are dropped, so positions shift when a row leaves a column
/// blank. Field lookups therefore anchor on the front (company, title,
/// location) or on the end (status, terms, date) of the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedRow<'a> {
    cells: Vec<&'a str>,
}

impl<'a> TokenizedRow<'a> {
    /// Tokenize a raw line, tolerating a leading diff `+` marker.
    pub fn parse(line: &'a str) -> Self {
        let cells = strip_diff_marker(line)
            .split(COLUMN_SEPARATOR)
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .collect();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `index` from the front.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.cells.get(index).copied()
    }

    /// Cell at `offset` from the end; `1` is the last cell.
    pub fn from_end(&self, offset: usize) -> Option<&'a str> {
        if offset == 0 || offset > self.cells.len() {
            return None;
        }
        self.get(self.cells.len() - offset)
    }

    pub fn cells(&self) -> &[&'a str] {
        &self.cells
    }
}

/// Drop a unified-diff addition marker that sits in front of the first `|`.
fn strip_diff_marker(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix('+') {
        Some(rest) if rest.trim_start().starts_with(COLUMN_SEPARATOR) => rest,
        _ => trimmed,
    }
}
