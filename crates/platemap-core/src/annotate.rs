//! Annotation of measurement rows with plate-map content and targets
//!
//! [`TableAnnotator`] looks every row's well up in the content table and the
//! target table. A lookup misses when the well lies outside a table's extent;
//! what happens then is chosen explicitly through [`LookupPolicy`]:
//!
//! - [`LookupPolicy::Strict`] (default): misses and malformed wells are
//!   collected over the whole table and reported together as
//!   [`Error::UnresolvedWells`], or as the first single error when
//!   [`AnnotateOptions::fail_fast`] is set.
//! - [`LookupPolicy::Lenient`]: misses annotate as the empty string.
//!
//! A well inside the extent whose slot is empty annotates as the empty string
//! under both policies. The annotator never filters rows.

use std::fmt;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::grid::PlateGrid;
use crate::measurement::{MeasurementTable, WELL_COLUMN};
use crate::plate_map::PlateMap;
use crate::well::WellAddress;

/// Output column with the target label
pub const TARGET_COLUMN: &str = "Target";

/// Output column with the well content
pub const CONTENT_COLUMN: &str = "Content";

/// Measurement rows with `Target` and `Content` appended
pub type AnnotatedTable = MeasurementTable;

/// What to do when a well is missing from a reference table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPolicy {
    /// Fail the annotation
    #[default]
    Strict,
    /// Annotate with the empty string
    Lenient,
}

/// Options for [`TableAnnotator`]
#[derive(Debug, Clone, Default)]
pub struct AnnotateOptions {
    /// Lookup policy for wells missing from a reference table
    pub policy: LookupPolicy,
    /// Under the strict policy, stop at the first failing row
    pub fail_fast: bool,
    /// Input columns left out of the output (e.g. `Fluor`)
    pub drop_columns: Vec<String>,
}

impl AnnotateOptions {
    /// Lenient lookups, no dropped columns
    pub fn lenient() -> Self {
        Self {
            policy: LookupPolicy::Lenient,
            ..Self::default()
        }
    }

    /// Add a column to leave out of the output
    pub fn drop_column<S: Into<String>>(mut self, name: S) -> Self {
        self.drop_columns.push(name.into());
        self
    }
}

/// The reference table a lookup ran against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTable {
    Content,
    Target,
}

impl fmt::Display for ReferenceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceTable::Content => write!(f, "content"),
            ReferenceTable::Target => write!(f, "target"),
        }
    }
}

/// Why a row could not be annotated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WellFailureReason {
    /// The well identifier does not parse
    Malformed,
    /// The well lies outside a reference table
    NotFound(ReferenceTable),
}

/// One row that could not be annotated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellFailure {
    /// Zero-based data row index
    pub row: usize,
    /// Well text as found in the row
    pub well: String,
    pub reason: WellFailureReason,
}

impl WellFailure {
    /// The single-row error this failure stands for
    pub fn to_error(&self) -> Error {
        match self.reason {
            WellFailureReason::Malformed => Error::MalformedWell(self.well.clone()),
            WellFailureReason::NotFound(table) => Error::UnresolvedWell {
                well: self.well.clone(),
                table,
            },
        }
    }
}

impl fmt::Display for WellFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            WellFailureReason::Malformed => {
                write!(f, "row {}: malformed well {:?}", self.row, self.well)
            }
            WellFailureReason::NotFound(table) => {
                write!(f, "row {}: well {:?} not in {} table", self.row, self.well, table)
            }
        }
    }
}

/// All rows of one annotation pass that could not be annotated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WellReport {
    failures: Vec<WellFailure>,
}

impl WellReport {
    pub fn failures(&self) -> &[WellFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    fn push(&mut self, failure: WellFailure) {
        self.failures.push(failure);
    }
}

impl fmt::Display for WellReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} well lookup(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  {}", failure)?;
        }
        Ok(())
    }
}

/// Joins measurement rows against the content and target tables
pub struct TableAnnotator<'a> {
    content: &'a PlateGrid<String>,
    targets: &'a PlateGrid<String>,
    options: AnnotateOptions,
}

impl<'a> TableAnnotator<'a> {
    /// Create an annotator with default (strict) options
    pub fn new(content: &'a PlateGrid<String>, targets: &'a PlateGrid<String>) -> Self {
        Self {
            content,
            targets,
            options: AnnotateOptions::default(),
        }
    }

    /// Create an annotator over the tables of a plate map
    pub fn for_plate_map(plate_map: &'a PlateMap) -> Self {
        Self::new(plate_map.content(), plate_map.targets())
    }

    /// Replace the options
    pub fn with_options(mut self, options: AnnotateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &AnnotateOptions {
        &self.options
    }

    /// Annotate every row of a measurement table
    ///
    /// The output keeps the input columns in order, minus the dropped ones,
    /// and appends `Target` then `Content`. Input columns already named
    /// `Target` or `Content` are replaced.
    pub fn annotate(&self, table: &MeasurementTable) -> Result<AnnotatedTable> {
        let well_col = table
            .column_index(WELL_COLUMN)
            .ok_or_else(|| Error::MissingColumn(WELL_COLUMN.to_string()))?;

        let kept: Vec<usize> = table
            .headers()
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                if name.as_str() == TARGET_COLUMN || name.as_str() == CONTENT_COLUMN {
                    warn!(column = %name, "replacing existing input column");
                    return false;
                }
                !self.options.drop_columns.iter().any(|d| d == *name)
            })
            .map(|(idx, _)| idx)
            .collect();

        let mut headers: Vec<String> = kept.iter().map(|&i| table.headers()[i].clone()).collect();
        headers.push(TARGET_COLUMN.to_string());
        headers.push(CONTENT_COLUMN.to_string());

        let mut report = WellReport::default();
        let mut rows = Vec::with_capacity(table.len());

        for (idx, row) in table.rows().iter().enumerate() {
            let well_text = &row[well_col];
            let recorded = report.len();
            let (target, content) = match self.lookup_row(idx, well_text, &mut report) {
                Some(pair) => pair,
                None if self.options.fail_fast => {
                    if let Some(failure) = report.failures().get(recorded) {
                        return Err(failure.to_error());
                    }
                    continue;
                }
                None => continue,
            };

            let mut out: Vec<String> = kept.iter().map(|&i| row[i].clone()).collect();
            out.push(target);
            out.push(content);
            rows.push(out);
        }

        if !report.is_empty() {
            return Err(Error::UnresolvedWells(report));
        }

        debug!(rows = rows.len(), "annotated measurement rows");
        Ok(MeasurementTable::new(headers, rows))
    }

    /// Target and content for one row, or `None` after recording a strict failure
    fn lookup_row(
        &self,
        row: usize,
        well_text: &str,
        report: &mut WellReport,
    ) -> Option<(String, String)> {
        let strict = self.options.policy == LookupPolicy::Strict;

        let well = match WellAddress::parse(well_text) {
            Ok(well) => well,
            Err(_) if strict => {
                report.push(WellFailure {
                    row,
                    well: well_text.to_string(),
                    reason: WellFailureReason::Malformed,
                });
                return None;
            }
            Err(_) => {
                warn!(row, well = well_text, "malformed well, leaving annotations empty");
                return Some((String::new(), String::new()));
            }
        };

        let mut failed = false;
        let mut resolve = |grid: &PlateGrid<String>, table: ReferenceTable| -> String {
            if grid.contains(&well) {
                return grid.get(&well).cloned().unwrap_or_default();
            }
            if strict {
                report.push(WellFailure {
                    row,
                    well: well_text.to_string(),
                    reason: WellFailureReason::NotFound(table),
                });
                failed = true;
            } else {
                debug!(row, %well, %table, "well outside reference table");
            }
            String::new()
        };

        let target = resolve(self.targets, ReferenceTable::Target);
        let content = resolve(self.content, ReferenceTable::Content);

        if failed {
            None
        } else {
            Some((target, content))
        }
    }
}
