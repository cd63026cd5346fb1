//! Row-letter x column-number indexed tables
//!
//! A [`PlateGrid`] is the shape shared by every reference table: a list of
//! row labels, a list of column numbers, and one slot per (row, column) pair.
//! Every slot inside the extent is either a value or an explicit empty marker.
//! Grids are produced by [`PlateGridBuilder`] and are read-only afterwards.

use ahash::AHashMap;

use crate::error::{Error, Result};
use crate::well::WellAddress;

/// A plate-shaped table of optional values
#[derive(Debug, Clone, PartialEq)]
pub struct PlateGrid<V> {
    rows: Vec<String>,
    columns: Vec<u32>,
    row_index: AHashMap<String, usize>,
    column_index: AHashMap<u32, usize>,
    /// Row-major slots, `rows.len() * columns.len()` long
    cells: Vec<Option<V>>,
}

impl<V> PlateGrid<V> {
    /// Row labels in plate order
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Column numbers in plate order
    pub fn columns(&self) -> &[u32] {
        &self.columns
    }

    /// (row count, column count)
    pub fn extent(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Check if the well lies inside the grid extent
    pub fn contains(&self, well: &WellAddress) -> bool {
        self.slot(well).is_some()
    }

    /// Get the value stored for a well
    ///
    /// Returns `None` both for empty slots and for wells outside the extent;
    /// use [`contains`](Self::contains) to tell them apart.
    pub fn get(&self, well: &WellAddress) -> Option<&V> {
        self.slot(well).and_then(|idx| self.cells[idx].as_ref())
    }

    /// Number of slots holding a value
    pub fn defined_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterate over every slot in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (WellAddress, Option<&V>)> + '_ {
        let width = self.columns.len();
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            let well =
                WellAddress::from_parts(self.rows[idx / width].clone(), self.columns[idx % width]);
            (well, cell.as_ref())
        })
    }

    /// Iterate over the slots holding a value
    pub fn values(&self) -> impl Iterator<Item = (WellAddress, &V)> + '_ {
        self.iter().filter_map(|(well, v)| v.map(|v| (well, v)))
    }

    /// Check that two grids share rows, columns, and the pattern of defined slots
    pub fn same_shape<U>(&self, other: &PlateGrid<U>) -> bool {
        self.rows == other.rows
            && self.columns == other.columns
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(a, b)| a.is_some() == b.is_some())
    }

    /// Build a grid of the same shape by converting every defined value
    ///
    /// Empty slots stay empty. The first conversion error aborts the build.
    pub fn try_map<U, E, F>(&self, mut f: F) -> std::result::Result<PlateGrid<U>, E>
    where
        F: FnMut(&WellAddress, &V) -> std::result::Result<U, E>,
    {
        let width = self.columns.len();
        let mut cells = Vec::with_capacity(self.cells.len());
        for (idx, cell) in self.cells.iter().enumerate() {
            let mapped = match cell {
                Some(v) => {
                    let well = WellAddress::from_parts(
                        self.rows[idx / width].clone(),
                        self.columns[idx % width],
                    );
                    Some(f(&well, v)?)
                }
                None => None,
            };
            cells.push(mapped);
        }

        Ok(PlateGrid {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            row_index: self.row_index.clone(),
            column_index: self.column_index.clone(),
            cells,
        })
    }

    fn slot(&self, well: &WellAddress) -> Option<usize> {
        let row = *self.row_index.get(well.row())?;
        let col = *self.column_index.get(&well.column())?;
        Some(row * self.columns.len() + col)
    }
}

/// Builder for [`PlateGrid`]
///
/// Columns are fixed first; rows are then pushed one at a time. Rows shorter
/// than the column list are padded with empty slots.
#[derive(Debug)]
pub struct PlateGridBuilder<V> {
    rows: Vec<String>,
    columns: Vec<u32>,
    row_index: AHashMap<String, usize>,
    column_index: AHashMap<u32, usize>,
    cells: Vec<Option<V>>,
}

impl<V> PlateGridBuilder<V> {
    /// Start a grid with the given column numbers
    pub fn new(columns: Vec<u32>) -> Result<Self> {
        let mut column_index = AHashMap::with_capacity(columns.len());
        for (idx, &column) in columns.iter().enumerate() {
            if column == 0 {
                return Err(Error::InvalidColumnHeader {
                    column: idx,
                    value: column.to_string(),
                });
            }
            if column_index.insert(column, idx).is_some() {
                return Err(Error::DuplicateColumnHeader(column));
            }
        }

        Ok(Self {
            rows: Vec::new(),
            columns,
            row_index: AHashMap::new(),
            column_index,
            cells: Vec::new(),
        })
    }

    /// Number of columns every row spans
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Append a row
    ///
    /// The label is upper-cased and must consist of letters only. Values
    /// beyond the grid width are an error.
    pub fn push_row<S: AsRef<str>>(&mut self, label: S, values: Vec<Option<V>>) -> Result<()> {
        let label = label.as_ref();
        if label.is_empty() || !label.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidRowLabel {
                row: self.rows.len(),
                value: label.to_string(),
            });
        }
        let label = label.to_ascii_uppercase();
        if self.row_index.contains_key(&label) {
            return Err(Error::DuplicateRowLabel(label));
        }
        if values.len() > self.columns.len() {
            return Err(Error::InvalidColumnHeader {
                column: values.len(),
                value: String::new(),
            });
        }

        let padding = self.columns.len() - values.len();
        self.cells.extend(values);
        self.cells.extend(std::iter::repeat_with(|| None).take(padding));
        self.row_index.insert(label.clone(), self.rows.len());
        self.rows.push(label);
        Ok(())
    }

    /// Finish the grid
    pub fn build(self) -> PlateGrid<V> {
        PlateGrid {
            rows: self.rows,
            columns: self.columns,
            row_index: self.row_index,
            column_index: self.column_index,
            cells: self.cells,
        }
    }
}
