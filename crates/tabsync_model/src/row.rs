//! Row types.

use serde::{Deserialize, Serialize};

/// A single text value. Absence is the empty string once normalized.
pub type Cell = String;

/// A row as produced by a store adapter, before normalization.
///
/// `None` stands for a cell the store reported as absent (e.g. SQL `NULL`).
pub type RawRow = Vec<Option<String>>;

/// A normalized row of cells.
///
/// The first cell is the record key. A row with no cells has an empty key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Row(Vec<Cell>);

impl Row {
    /// Creates a row from already-normalized cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    /// Normalizes a raw row: trims every cell and maps absent cells to
    /// empty text, then pads with empty cells up to `width`.
    pub(crate) fn from_raw(raw: &[Option<String>], width: usize) -> Self {
        let mut cells: Vec<Cell> = raw
            .iter()
            .map(|cell| cell.as_deref().map(str::trim).unwrap_or_default().to_owned())
            .collect();
        if cells.len() < width {
            cells.resize(width, Cell::new());
        }
        Self(cells)
    }

    /// Returns the record key (first cell), or `""` for an empty row.
    pub fn key(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }

    /// Returns the cells of this row.
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    /// Returns the cell at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Returns the number of cells.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if every cell is empty text.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(String::is_empty)
    }

    /// Converts back into the raw shape accepted by [`crate::Snapshot::normalize`].
    pub fn to_raw(&self) -> RawRow {
        self.0.iter().cloned().map(Some).collect()
    }

    /// Consumes the row, returning its cells.
    pub fn into_cells(self) -> Vec<Cell> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Self(cells)
    }
}
