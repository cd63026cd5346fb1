//! # platemap-xlsx
//!
//! XLSX (Office Open XML) reader and writer for platemap.
//!
//! The reader decodes the first worksheet of a plate-map workbook into a
//! [`SheetMatrix`](platemap_core::SheetMatrix), keeping the theme fill of
//! every cell. The writer stores a measurement table as a single-sheet
//! workbook.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::{XlsxWriteOptions, XlsxWriter};
