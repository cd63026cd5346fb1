//! # platemap-core
//!
//! Core types for reconciling qPCR measurement tables with a plate map.
//!
//! A plate map is a worksheet laying out a multi-well plate: one row per
//! plate row letter, one column per plate column number. Each well holds
//! free-text content and a fill colour; a legend row below the grid maps
//! every fill colour to a target (gene) label. This crate provides:
//!
//! - [`WellAddress`] - Well identifiers such as `A1` or `H12`
//! - [`ThemeFill`] and [`ColorKey`] - Fill colours and their comparable keys
//! - [`PlateGrid`] - Row-letter x column-number indexed tables
//! - [`PlateMap`] - The content and target tables built from a worksheet
//! - [`MeasurementTable`] and [`RawTableAssembler`] - Measurement rows
//! - [`TableAnnotator`] - Joins measurement rows with the plate map
//!
//! Reading worksheets from files lives in `platemap-xlsx`; this crate works
//! on the in-memory [`SheetMatrix`].
//!
//! ## Example
//!
//! ```rust
//! use platemap_core::{
//!     MeasurementTable, PlateMap, SheetCell, SheetMatrix, TableAnnotator, ThemeFill,
//! };
//!
//! let gusb = ThemeFill::new(4, 0.4);
//! let sheet = SheetMatrix::new(vec![
//!     vec![SheetCell::empty(), SheetCell::text("1")],
//!     vec![SheetCell::text("A"), SheetCell::filled("0Gy D1", gusb)],
//!     vec![],
//!     vec![],
//!     vec![SheetCell::filled("GUSB", gusb)],
//! ]);
//! let plate_map = PlateMap::from_sheet(&sheet).unwrap();
//!
//! let table = MeasurementTable::new(
//!     vec!["Well".into(), "Cq".into()],
//!     vec![vec!["A1".into(), "21.3".into()]],
//! );
//! let annotated = TableAnnotator::for_plate_map(&plate_map)
//!     .annotate(&table)
//!     .unwrap();
//! assert_eq!(annotated.value(0, "Target"), Some("GUSB"));
//! assert_eq!(annotated.value(0, "Content"), Some("0Gy D1"));
//! ```

pub mod annotate;
pub mod color;
pub mod error;
pub mod grid;
pub mod legend;
pub mod measurement;
pub mod plate_map;
pub mod sheet;
pub mod well;

// Re-exports for convenience
pub use annotate::{
    AnnotateOptions, AnnotatedTable, LookupPolicy, ReferenceTable, TableAnnotator, WellFailure,
    WellFailureReason, WellReport, CONTENT_COLUMN, TARGET_COLUMN,
};
pub use color::{ColorKey, ThemeFill};
pub use error::{Error, Result};
pub use grid::{PlateGrid, PlateGridBuilder};
pub use legend::{ColorKeyResolver, ColorLegend, LegendConflict, LegendEntry, LEGEND_ROW_OFFSET};
pub use measurement::{
    ExtractedTable, MeasurementSource, MeasurementTable, RawTableAssembler, CQ_COLUMN,
    UNDETERMINED, WELL_COLUMN,
};
pub use plate_map::{
    ColorKeyGrid, ContentTable, LegendParser, ParsedGrid, PlateMap, TargetTable, HEADER_ROW,
    LABEL_COLUMN,
};
pub use sheet::{SheetCell, SheetMatrix};
pub use well::WellAddress;
