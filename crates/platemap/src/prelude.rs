//! Prelude module - common imports for platemap users
//!
//! ```rust
//! use platemap::prelude::*;
//! ```

pub use crate::{
    // Pipeline
    annotate_table,
    convert,
    load_measurements,
    write_table,
    AnnotateOptions,
    ConversionOptions,
    ConvertError,
    // Core types
    Error,
    LookupPolicy,
    MeasurementFormat,
    MeasurementTable,
    OutputFormat,
    PlateMap,
    PlateMapSummary,
    Result,
    TableAnnotator,
    WellAddress,

    // I/O types
    CsvReader,
    CsvWriter,
    XlsxReader,
    XlsxWriter,
};
