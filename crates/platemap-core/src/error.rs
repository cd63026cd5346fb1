//! Error types for platemap-core

use thiserror::Error;

use crate::annotate::{ReferenceTable, WellReport};
use crate::color::ColorKey;
use crate::legend::LegendConflict;
use crate::well::WellAddress;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building reference tables or annotating rows
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Well identifier could not be split into a row and a column
    #[error("Malformed well identifier: {0:?}")]
    MalformedWell(String),

    /// No blank row ends the plate grid
    #[error("Plate map grid has no blank terminator row (scanned {rows} rows)")]
    UnterminatedGrid { rows: usize },

    /// The header row carries no column numbers
    #[error("Plate map header row is empty")]
    EmptyHeaderRow,

    /// A header cell is not a positive column number
    #[error("Invalid column header {value:?} in column {column}")]
    InvalidColumnHeader { column: usize, value: String },

    /// Two header cells name the same plate column
    #[error("Column {0} appears more than once in the header row")]
    DuplicateColumnHeader(u32),

    /// A data row's label is missing or not made of letters
    #[error("Invalid row label {value:?} in row {row}")]
    InvalidRowLabel { row: usize, value: String },

    /// Two data rows carry the same label
    #[error("Row label {0:?} appears more than once")]
    DuplicateRowLabel(String),

    /// A cell that needs a colour key is not filled with a theme colour
    #[error("Cell at row {row}, column {column} has no theme fill colour")]
    MissingFill { row: usize, column: usize },

    /// The worksheet ends before the legend row
    #[error("Legend row {row} is beyond the end of the worksheet")]
    MissingLegendRow { row: usize },

    /// The legend row exists but holds no labels
    #[error("Legend row {row} is blank")]
    EmptyLegendRow { row: usize },

    /// Two legend entries share a colour or a label
    #[error("Duplicate legend entry ({conflict}); keys: {keys:?}, labels: {labels:?}")]
    DuplicateLegendEntry {
        conflict: LegendConflict,
        keys: Vec<ColorKey>,
        labels: Vec<String>,
    },

    /// A plate cell is coloured with a key that the legend does not define
    #[error("Colour key {key} at well {well} has no legend entry")]
    UnresolvedColorKey { key: ColorKey, well: WellAddress },

    /// Strict lookup of a single well failed
    #[error("Well {well:?} is not in the {table} reference table")]
    UnresolvedWell { well: String, table: ReferenceTable },

    /// Aggregated per-row lookup failures of one annotation pass
    #[error("{0}")]
    UnresolvedWells(WellReport),

    /// The measurement table lacks a required column
    #[error("Measurement table has no {0:?} column")]
    MissingColumn(String),
}
