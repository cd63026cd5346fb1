//! Plate-map worksheet parsing
//!
//! A plate-map worksheet has a fixed layout:
//!
//! ```text
//! row 0          | <corner> | 1        | 2        | ... column numbers
//! rows 1..t      | A        | content  | content  | ... one row per plate row
//! row t          |          |          |          |     blank terminator
//! row t + 1      |          |          |          |     spacer
//! row t + 2      | GUSB     | TP53     | ...                legend labels
//! ```
//!
//! Content cells carry free text and a fill colour; the colour picks the
//! target through the legend row. [`LegendParser`] splits the grid into a
//! content table and a colour-key grid in lock-step, and [`PlateMap`] ties in
//! the legend to produce the two read-only reference tables.

use tracing::{debug, warn};

use crate::color::ColorKey;
use crate::error::{Error, Result};
use crate::grid::{PlateGrid, PlateGridBuilder};
use crate::legend::{ColorKeyResolver, ColorLegend};
use crate::sheet::{SheetCell, SheetMatrix};

/// Row holding the column numbers
pub const HEADER_ROW: usize = 0;

/// Column holding the row letters
pub const LABEL_COLUMN: usize = 0;

/// Free-text content per well
pub type ContentTable = PlateGrid<String>;

/// Colour key per well with content
pub type ColorKeyGrid = PlateGrid<ColorKey>;

/// Target label per well with content
pub type TargetTable = PlateGrid<String>;

/// Output of [`LegendParser::parse`]
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGrid {
    /// Content per well
    pub content: ContentTable,
    /// Colour key per well, defined exactly where content is non-empty
    pub color_keys: ColorKeyGrid,
    /// Zero-based index of the blank row ending the grid
    pub terminator: usize,
}

/// Splits the plate grid of a worksheet into content and colour-key grids
pub struct LegendParser;

impl LegendParser {
    /// Parse the grid region of a plate-map worksheet
    pub fn parse(matrix: &SheetMatrix) -> Result<ParsedGrid> {
        let header = matrix.row(HEADER_ROW).ok_or(Error::EmptyHeaderRow)?;
        let columns = Self::parse_header(header)?;

        let terminator = (HEADER_ROW + 1..matrix.row_count())
            .find(|&row| matrix.is_blank_row(row))
            .ok_or(Error::UnterminatedGrid {
                rows: matrix.row_count(),
            })?;
        debug!(terminator, columns = columns.len(), "found plate grid terminator");

        let width = columns.len();
        let mut content = PlateGridBuilder::new(columns.clone())?;
        let mut color_keys = PlateGridBuilder::new(columns)?;

        for row in HEADER_ROW + 1..terminator {
            let cells = matrix.row(row).unwrap_or(&[]);
            let label = Self::row_label(cells, row)?;

            let mut texts = Vec::with_capacity(width);
            let mut keys = Vec::with_capacity(width);
            for (offset, cell) in cells.iter().skip(LABEL_COLUMN + 1).enumerate() {
                let column = LABEL_COLUMN + 1 + offset;
                if offset >= width {
                    if !cell.is_empty() {
                        warn!(row, column, "ignoring content beyond the last column header");
                    }
                    continue;
                }

                // A key exists exactly where content exists
                match cell.text_value() {
                    Some(text) => {
                        let fill = cell.fill.ok_or(Error::MissingFill { row, column })?;
                        texts.push(Some(text.to_string()));
                        keys.push(Some(fill.key()));
                    }
                    None => {
                        texts.push(None);
                        keys.push(None);
                    }
                }
            }

            content.push_row(&label, texts)?;
            color_keys.push_row(&label, keys)?;
        }

        Ok(ParsedGrid {
            content: content.build(),
            color_keys: color_keys.build(),
            terminator,
        })
    }

    /// Column numbers from the header row, skipping the label column
    ///
    /// Trailing empty header cells are dropped; any other header cell must be
    /// a positive integer.
    fn parse_header(header: &[SheetCell]) -> Result<Vec<u32>> {
        let cells = header.get(LABEL_COLUMN + 1..).unwrap_or(&[]);
        let used = cells
            .iter()
            .rposition(|c| !c.is_empty())
            .map_or(0, |last| last + 1);
        if used == 0 {
            return Err(Error::EmptyHeaderRow);
        }

        cells[..used]
            .iter()
            .enumerate()
            .map(|(offset, cell)| {
                let column = LABEL_COLUMN + 1 + offset;
                let text = cell.text_value().unwrap_or("");
                parse_column_number(text).ok_or_else(|| Error::InvalidColumnHeader {
                    column,
                    value: text.to_string(),
                })
            })
            .collect()
    }

    fn row_label(cells: &[SheetCell], row: usize) -> Result<String> {
        let label = cells
            .get(LABEL_COLUMN)
            .and_then(SheetCell::text_value)
            .map(str::trim)
            .unwrap_or("");
        if label.is_empty() || !label.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidRowLabel {
                row,
                value: label.to_string(),
            });
        }
        Ok(label.to_ascii_uppercase())
    }
}

/// Parse a header cell as a column number ("7", "7.0", " 7 ")
fn parse_column_number(text: &str) -> Option<u32> {
    let text = text.trim();
    if let Ok(n) = text.parse::<u32>() {
        return (n > 0).then_some(n);
    }
    let n = text.parse::<f64>().ok()?;
    if n.fract() == 0.0 && n >= 1.0 && n <= f64::from(u32::MAX) {
        Some(n as u32)
    } else {
        None
    }
}

/// The reference tables of one plate map
///
/// Built once from a worksheet and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateMap {
    content: ContentTable,
    targets: TargetTable,
    legend: ColorLegend,
}

impl PlateMap {
    /// Build the content and target tables from a plate-map worksheet
    pub fn from_sheet(matrix: &SheetMatrix) -> Result<Self> {
        let parsed = LegendParser::parse(matrix)?;
        let (legend, targets) =
            ColorKeyResolver::resolve(matrix, parsed.terminator, &parsed.color_keys)?;
        debug!(
            wells = parsed.content.defined_count(),
            targets = legend.len(),
            "built plate map reference tables"
        );

        Ok(Self {
            content: parsed.content,
            targets,
            legend,
        })
    }

    /// Free-text content per well
    pub fn content(&self) -> &ContentTable {
        &self.content
    }

    /// Target label per well
    pub fn targets(&self) -> &TargetTable {
        &self.targets
    }

    /// The colour legend the targets were resolved through
    pub fn legend(&self) -> &ColorLegend {
        &self.legend
    }
}
