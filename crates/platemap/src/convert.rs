//! The conversion pipeline
//!
//! plate map + measurements -> annotated table -> file
//!
//! 1. Read the plate-map workbook and build the content and target tables.
//! 2. Read the measurements and assemble them into one uniform table.
//! 3. Annotate every row with `Target` and `Content`.
//! 4. Optionally drop `Undetermined` rows.
//! 5. Write the result, as xlsx or csv depending on the output extension.
//!
//! The output path is checked before any input is read. The output is
//! staged in a temporary file and only moved into place once fully written.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use platemap_core::{
    AnnotateOptions, MeasurementSource, MeasurementTable, PlateMap, RawTableAssembler,
    TableAnnotator,
};
use platemap_csv::{CsvError, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
use platemap_xlsx::{XlsxError, XlsxReader, XlsxWriteOptions, XlsxWriter};

use crate::documents;

/// Output path used when none is given
pub const DEFAULT_OUTPUT: &str = "converted_output.xlsx";

/// Fluorophore channel column, dropped from document tables by default
pub const FLUOR_COLUMN: &str = "Fluor";

/// Result type for conversions
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur during a conversion
#[derive(Debug, Error)]
pub enum ConvertError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Plate-map or annotation error
    #[error(transparent)]
    Core(#[from] platemap_core::Error),

    /// Workbook error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),

    /// Delimited table error
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Document-table JSON error
    #[error("Document table error: {0}")]
    Json(#[from] serde_json::Error),

    /// The output path exists and overwriting was not requested
    #[error("Destination already exists: {} (use --force to overwrite)", .0.display())]
    DestinationExists(PathBuf),

    /// The file extension names no supported format
    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

impl ConvertError {
    /// The core error behind this one, if any
    ///
    /// Core errors reached through the workbook reader are unwrapped too.
    pub fn core(&self) -> Option<&platemap_core::Error> {
        match self {
            ConvertError::Core(e) | ConvertError::Xlsx(XlsxError::Core(e)) => Some(e),
            _ => None,
        }
    }
}

/// How the measurement input is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementFormat {
    /// Tables extracted from a multi-page report, as JSON
    Documents,
    /// One delimited table with a header row
    Flat,
}

impl MeasurementFormat {
    /// Pick the format from a file extension (`.json` or `.csv`/`.tsv`/`.txt`)
    pub fn from_path(path: &Path) -> Option<Self> {
        match extension(path).as_deref() {
            Some("json") => Some(MeasurementFormat::Documents),
            Some("csv") | Some("tsv") | Some("txt") => Some(MeasurementFormat::Flat),
            _ => None,
        }
    }

    /// Columns left out of the output unless configured otherwise
    pub fn default_drop_columns(&self) -> &'static [&'static str] {
        match self {
            MeasurementFormat::Documents => &[FLUOR_COLUMN],
            MeasurementFormat::Flat => &[],
        }
    }
}

/// File format of the annotated output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match extension(path).as_deref() {
            Some("xlsx") => Some(OutputFormat::Xlsx),
            Some("csv") => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

/// Options for a conversion
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Annotation options (lookup policy, dropped columns)
    pub annotate: AnnotateOptions,
    /// Drop rows whose `Cq` is `Undetermined` after annotation
    pub drop_undetermined: bool,
    /// Replace an existing output file
    pub overwrite: bool,
}

impl ConversionOptions {
    /// Default options for a measurement format
    ///
    /// Document tables drop the `Fluor` column; flat tables keep every column.
    pub fn for_format(format: MeasurementFormat) -> Self {
        let mut options = Self::default();
        options.annotate.drop_columns = format
            .default_drop_columns()
            .iter()
            .map(|c| c.to_string())
            .collect();
        options
    }
}

/// Summary of a finished conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    /// Measurement rows read
    pub rows_read: usize,
    /// Rows written
    pub rows_written: usize,
    /// Path written
    pub output: PathBuf,
    pub format: OutputFormat,
}

/// Read measurements and assemble them into one table
pub fn load_measurements(path: &Path, format: MeasurementFormat) -> ConvertResult<MeasurementTable> {
    let source = match format {
        MeasurementFormat::Documents => MeasurementSource::Documents(documents::read_file(path)?),
        MeasurementFormat::Flat => {
            let options = CsvReadOptions {
                delimiter: if extension(path).as_deref() == Some("tsv") {
                    b'\t'
                } else {
                    b','
                },
                ..CsvReadOptions::default()
            };
            MeasurementSource::Flat(CsvReader::read_file(path, &options)?)
        }
    };
    Ok(RawTableAssembler::assemble(source))
}

/// Annotate a table and apply the post-annotation row filter
pub fn annotate_table(
    plate_map: &PlateMap,
    table: &MeasurementTable,
    options: &ConversionOptions,
) -> ConvertResult<MeasurementTable> {
    let annotated = TableAnnotator::for_plate_map(plate_map)
        .with_options(options.annotate.clone())
        .annotate(table)?;

    if !options.drop_undetermined {
        return Ok(annotated);
    }

    let kept = annotated.without_undetermined();
    debug!(
        dropped = annotated.len() - kept.len(),
        "dropped undetermined rows"
    );
    Ok(kept)
}

/// Fail if the destination exists and overwriting is off
pub fn check_destination(path: &Path, overwrite: bool) -> ConvertResult<()> {
    if !overwrite && path.exists() {
        return Err(ConvertError::DestinationExists(path.to_path_buf()));
    }
    Ok(())
}

/// Write a table to `path` in the format its extension names
///
/// The table is encoded into a temporary file next to `path`, which is then
/// moved into place. A failed write leaves no file behind.
pub fn write_table(
    table: &MeasurementTable,
    path: &Path,
    overwrite: bool,
) -> ConvertResult<OutputFormat> {
    let format =
        OutputFormat::from_path(path).ok_or_else(|| ConvertError::UnsupportedFormat(path.into()))?;
    check_destination(path, overwrite)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;

    match format {
        OutputFormat::Xlsx => {
            XlsxWriter::write(table, staged.as_file_mut(), &XlsxWriteOptions::default())?;
        }
        OutputFormat::Csv => {
            let mut writer = BufWriter::new(staged.as_file_mut());
            CsvWriter::write(table, &mut writer, &CsvWriteOptions::default())?;
            writer.flush()?;
        }
    }
    staged.as_file().sync_all()?;

    let persisted = if overwrite {
        staged.persist(path)
    } else {
        staged.persist_noclobber(path)
    };
    persisted.map_err(|e| match e.error.kind() {
        io::ErrorKind::AlreadyExists => ConvertError::DestinationExists(path.to_path_buf()),
        _ => ConvertError::Io(e.error),
    })?;

    debug!(output = %path.display(), ?format, "wrote annotated table");
    Ok(format)
}

/// Run the whole pipeline
pub fn convert(
    measurements: &Path,
    format: MeasurementFormat,
    plate_map: &Path,
    output: &Path,
    options: &ConversionOptions,
) -> ConvertResult<ConversionReport> {
    if OutputFormat::from_path(output).is_none() {
        return Err(ConvertError::UnsupportedFormat(output.to_path_buf()));
    }
    check_destination(output, options.overwrite)?;

    let plate_map = XlsxReader::read_plate_map_file(plate_map)?;
    let table = load_measurements(measurements, format)?;
    let annotated = annotate_table(&plate_map, &table, options)?;
    let format = write_table(&annotated, output, options.overwrite)?;

    info!(
        rows_read = table.len(),
        rows_written = annotated.len(),
        output = %output.display(),
        "conversion finished"
    );

    Ok(ConversionReport {
        rows_read: table.len(),
        rows_written: annotated.len(),
        output: output.to_path_buf(),
        format,
    })
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_from_extension() {
        assert_eq!(
            MeasurementFormat::from_path(Path::new("run.JSON")),
            Some(MeasurementFormat::Documents)
        );
        assert_eq!(
            MeasurementFormat::from_path(Path::new("run.csv")),
            Some(MeasurementFormat::Flat)
        );
        assert_eq!(MeasurementFormat::from_path(Path::new("run.pdf")), None);
        assert_eq!(
            OutputFormat::from_path(Path::new(DEFAULT_OUTPUT)),
            Some(OutputFormat::Xlsx)
        );
        assert_eq!(OutputFormat::from_path(Path::new("out")), None);
    }

    #[test]
    fn test_default_dropped_columns() {
        let docs = ConversionOptions::for_format(MeasurementFormat::Documents);
        assert_eq!(docs.annotate.drop_columns, vec!["Fluor".to_string()]);
        let flat = ConversionOptions::for_format(MeasurementFormat::Flat);
        assert!(flat.annotate.drop_columns.is_empty());
        assert!(!flat.overwrite);
        assert!(!flat.drop_undetermined);
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let missing = dir.path().join("missing").join("out.csv");
        let table = MeasurementTable::new(vec!["Well".into()], vec![vec!["A1".into()]]);

        assert!(matches!(
            write_table(&table, &missing, false),
            Err(ConvertError::Io(_))
        ));
        assert!(!missing.exists());

        write_table(&table, &path, false).unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("out.xlsx")]);
    }

    #[test]
    fn test_core_error_unwraps_reader_errors() {
        let err = ConvertError::Xlsx(XlsxError::Core(platemap_core::Error::EmptyHeaderRow));
        assert_eq!(err.core(), Some(&platemap_core::Error::EmptyHeaderRow));
        assert_eq!(
            ConvertError::DestinationExists(PathBuf::from("x.xlsx")).core(),
            None
        );
    }
}
