//! # platemap
//!
//! Annotate qPCR measurement tables with the target and content of every
//! well, taken from a colour-coded plate-map workbook.
//!
//! ## Features
//!
//! - Read plate maps from XLSX workbooks (theme fill colours select targets)
//! - Read measurements from CSV or from extracted report tables (JSON)
//! - Strict or lenient well lookups, with every failing row reported
//! - Write the annotated table as XLSX or CSV
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use platemap::prelude::*;
//!
//! let options = ConversionOptions::for_format(MeasurementFormat::Flat);
//! let report = convert(
//!     Path::new("run.csv"),
//!     MeasurementFormat::Flat,
//!     Path::new("plate.xlsx"),
//!     Path::new("converted_output.xlsx"),
//!     &options,
//! )
//! .unwrap();
//! println!("wrote {} rows", report.rows_written);
//! ```

pub mod convert;
pub mod documents;
pub mod inspect;
pub mod prelude;

pub use convert::{
    annotate_table, check_destination, convert, load_measurements, write_table,
    ConversionOptions, ConversionReport, ConvertError, ConvertResult, MeasurementFormat,
    OutputFormat, DEFAULT_OUTPUT, FLUOR_COLUMN,
};
pub use inspect::{PlateMapSummary, WellSummary};

// Re-export core types
pub use platemap_core::{
    AnnotateOptions, ColorKey, ColorLegend, Error, ExtractedTable, LegendEntry, LookupPolicy,
    MeasurementSource, MeasurementTable, PlateGrid, PlateMap, RawTableAssembler, Result,
    SheetCell, SheetMatrix, TableAnnotator, ThemeFill, WellAddress, WellReport,
};

// Re-export I/O types
pub use platemap_csv::{CsvError, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
pub use platemap_xlsx::{XlsxError, XlsxReader, XlsxWriteOptions, XlsxWriter};
