//! Measurement tables and their assembly from raw extractor output

use tracing::{debug, warn};

/// Column naming the well of each measurement row
pub const WELL_COLUMN: &str = "Well";

/// Column holding the quantification cycle
pub const CQ_COLUMN: &str = "Cq";

/// Cq value reported for wells that never crossed the threshold
pub const UNDETERMINED: &str = "Undetermined";

/// A table as produced by a document extractor: rows of optional cell text
pub type ExtractedTable = Vec<Vec<Option<String>>>;

/// A uniform table of measurement rows addressable by column name
///
/// Every row has exactly one cell per header. Cell text is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawMeasurementTable"))]
pub struct MeasurementTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MeasurementTable {
    /// Create a table; short rows are padded with empty cells, long rows truncated
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        for (idx, row) in rows.iter_mut().enumerate() {
            if row.len() > width {
                warn!(row = idx, cells = row.len(), width, "dropping cells beyond the header");
            }
            row.resize(width, String::new());
        }
        Self { headers, rows }
    }

    /// Column names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name (first match)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text by row index and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// Copy of the table keeping only the rows matching a predicate
    pub fn filter_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&[String]) -> bool,
    {
        Self {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// Copy of the table without rows whose Cq is `Undetermined`
    pub fn without_undetermined(&self) -> Self {
        match self.column_index(CQ_COLUMN) {
            Some(cq) => self.filter_rows(|row| row[cq].trim() != UNDETERMINED),
            None => self.clone(),
        }
    }
}

/// Deserialized form of a table, normalized through [`MeasurementTable::new`]
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawMeasurementTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[cfg(feature = "serde")]
impl From<RawMeasurementTable> for MeasurementTable {
    fn from(raw: RawMeasurementTable) -> Self {
        MeasurementTable::new(raw.headers, raw.rows)
    }
}

/// Raw measurement input, tagged by the caller with its source format
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementSource {
    /// Independently extracted tables of a multi-page document
    Documents(Vec<ExtractedTable>),
    /// One already-uniform delimited table
    Flat(MeasurementTable),
}

/// Normalizes raw measurement input into one uniform table
pub struct RawTableAssembler;

impl RawTableAssembler {
    /// Assemble a measurement source
    pub fn assemble(source: MeasurementSource) -> MeasurementTable {
        match source {
            MeasurementSource::Documents(tables) => Self::from_documents(tables),
            MeasurementSource::Flat(table) => table,
        }
    }

    /// Concatenate the extracted tables whose first row names the `Well` column
    ///
    /// The first row of each kept table becomes its header and is not data.
    /// Rows keep their source order. When kept tables disagree on their
    /// headers, columns are matched by name in first-seen order and missing
    /// cells are left empty. No matching table yields an empty table.
    pub fn from_documents(tables: Vec<ExtractedTable>) -> MeasurementTable {
        let total = tables.len();
        let mut headers: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut kept = 0usize;

        for (idx, table) in tables.into_iter().enumerate() {
            let mut table_rows = table.into_iter();
            let Some(first) = table_rows.next() else {
                continue;
            };
            let table_headers: Vec<String> =
                first.into_iter().map(Option::unwrap_or_default).collect();
            if !table_headers.iter().any(|h| h == WELL_COLUMN) {
                debug!(table = idx, "skipping extracted table without a Well header");
                continue;
            }
            kept += 1;

            // Position of each of this table's columns in the combined header.
            // The nth column of a given name maps to the nth combined column of
            // that name, so repeated and blank headers keep their own slots.
            let mut positions: Vec<usize> = Vec::with_capacity(table_headers.len());
            for (col, name) in table_headers.iter().enumerate() {
                let nth = table_headers[..col].iter().filter(|h| *h == name).count();
                let existing = headers
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| *h == name)
                    .nth(nth)
                    .map(|(pos, _)| pos);
                positions.push(match existing {
                    Some(pos) => pos,
                    None => {
                        headers.push(name.clone());
                        headers.len() - 1
                    }
                });
            }

            for raw in table_rows {
                let mut row = vec![String::new(); headers.len()];
                for (cell, &pos) in raw.into_iter().zip(positions.iter()) {
                    row[pos] = cell.unwrap_or_default();
                }
                rows.push(row);
            }
        }

        debug!(tables = total, kept, rows = rows.len(), "assembled extracted tables");
        MeasurementTable::new(headers, rows)
    }
}
