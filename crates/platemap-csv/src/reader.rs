//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use platemap_core::MeasurementTable;

/// CSV file reader
///
/// The first record is the header row. Every field is kept as text; no type
/// detection is applied, so values such as `Undetermined` or `007` pass
/// through unchanged.
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a measurement table
    pub fn read_file<P: AsRef<Path>>(
        path: P,
        options: &CsvReadOptions,
    ) -> CsvResult<MeasurementTable> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a measurement table
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<MeasurementTable> {
        let trim = if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(true)
            .flexible(true)
            .trim(trim)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(CsvError::MissingHeader);
        }

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!(columns = headers.len(), rows = rows.len(), "read csv table");
        Ok(MeasurementTable::new(headers, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fields_are_verbatim() {
        let data = "Well,Fluor,Cq,Sample\nA01,SYBR,Undetermined, 007\nB2,SYBR,21.30,\"a, b\"\n";
        let table = CsvReader::read(data.as_bytes(), &CsvReadOptions::default()).unwrap();

        assert_eq!(table.headers(), &["Well", "Fluor", "Cq", "Sample"]);
        assert_eq!(table.value(0, "Cq"), Some("Undetermined"));
        assert_eq!(table.value(0, "Sample"), Some(" 007"));
        assert_eq!(table.value(1, "Cq"), Some("21.30"));
        assert_eq!(table.value(1, "Sample"), Some("a, b"));
    }

    #[test]
    fn test_trim_and_delimiter() {
        let data = " Well ; Cq \n A1 ; 20.5 \n";
        let options = CsvReadOptions {
            delimiter: b';',
            trim: true,
            ..CsvReadOptions::default()
        };
        let table = CsvReader::read(data.as_bytes(), &options).unwrap();
        assert_eq!(table.headers(), &["Well", "Cq"]);
        assert_eq!(table.rows(), &[vec!["A1".to_string(), "20.5".to_string()]]);
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let data = "Well,Cq\nA1\nA2,19.0\n";
        let table = CsvReader::read(data.as_bytes(), &CsvReadOptions::default()).unwrap();
        assert_eq!(table.value(0, "Cq"), Some(""));
        assert_eq!(table.value(1, "Cq"), Some("19.0"));
    }

    #[test]
    fn test_empty_input() {
        let result = CsvReader::read("".as_bytes(), &CsvReadOptions::default());
        assert!(matches!(result, Err(CsvError::MissingHeader)));
    }
}
