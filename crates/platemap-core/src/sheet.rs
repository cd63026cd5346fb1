//! Decoded worksheet cells
//!
//! The spreadsheet decoder hands the core a [`SheetMatrix`]: a rectangular,
//! zero-based grid of [`SheetCell`]s carrying the displayed text and, when the
//! cell is filled with a theme colour, its `{theme, tint}` pair.

use crate::color::ThemeFill;

/// One decoded worksheet cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetCell {
    /// Cell text (`None` for a cell without a value)
    pub value: Option<String>,
    /// Theme fill colour, if the cell has one
    pub fill: Option<ThemeFill>,
}

impl SheetCell {
    /// A cell with neither value nor fill
    pub fn empty() -> Self {
        Self::default()
    }

    /// A cell with text and no fill
    pub fn text<S: Into<String>>(value: S) -> Self {
        Self {
            value: Some(value.into()),
            fill: None,
        }
    }

    /// A cell with text and a theme fill
    pub fn filled<S: Into<String>>(value: S, fill: ThemeFill) -> Self {
        Self {
            value: Some(value.into()),
            fill: Some(fill),
        }
    }

    /// The cell text, treating an empty string as no value
    pub fn text_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|s| !s.is_empty())
    }

    /// Check if the cell holds no value
    pub fn is_empty(&self) -> bool {
        self.text_value().is_none()
    }
}

/// A rectangular matrix of worksheet cells
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetMatrix {
    rows: Vec<Vec<SheetCell>>,
    width: usize,
}

impl SheetMatrix {
    /// Create a matrix, padding short rows with empty cells
    pub fn new(mut rows: Vec<Vec<SheetCell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize_with(width, SheetCell::empty);
        }
        Self { rows, width }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get a row by zero-based index
    pub fn row(&self, index: usize) -> Option<&[SheetCell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Get a cell by zero-based row and column
    pub fn cell(&self, row: usize, col: usize) -> Option<&SheetCell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Check if every cell of a row is empty
    ///
    /// Rows past the end of the matrix are not blank, they do not exist.
    pub fn is_blank_row(&self, index: usize) -> bool {
        self.rows
            .get(index)
            .map_or(false, |row| row.iter().all(SheetCell::is_empty))
    }

    /// Iterate over the rows
    pub fn iter_rows(&self) -> impl Iterator<Item = &[SheetCell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_and_access() {
        let matrix = SheetMatrix::new(vec![
            vec![SheetCell::text("a"), SheetCell::text("b")],
            vec![],
            vec![SheetCell::text("c")],
        ]);
        assert_eq!(matrix.row_count(), 3);
        assert_eq!(matrix.width(), 2);
        assert_eq!(matrix.row(1).map(<[SheetCell]>::len), Some(2));
        assert_eq!(matrix.cell(2, 0).and_then(SheetCell::text_value), Some("c"));
        assert_eq!(matrix.cell(2, 1), Some(&SheetCell::empty()));
        assert_eq!(matrix.cell(5, 0), None);
    }

    #[test]
    fn test_blank_rows() {
        let matrix = SheetMatrix::new(vec![
            vec![SheetCell::text("x")],
            vec![SheetCell::empty()],
            vec![SheetCell::text("")],
            vec![SheetCell {
                value: None,
                fill: Some(ThemeFill::new(4, 0.0)),
            }],
        ]);
        assert!(!matrix.is_blank_row(0));
        assert!(matrix.is_blank_row(1));
        // Empty strings and fill-only cells count as empty
        assert!(matrix.is_blank_row(2));
        assert!(matrix.is_blank_row(3));
        assert!(!matrix.is_blank_row(4));
    }
}
