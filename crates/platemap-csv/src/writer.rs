//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvWriteOptions, LineTerminator};
use platemap_core::MeasurementTable;

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a measurement table to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        table: &MeasurementTable,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(table, file, options)
    }

    /// Write a measurement table to a writer
    pub fn write<W: Write>(
        table: &MeasurementTable,
        writer: W,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .from_writer(writer);

        if options.write_header {
            csv_writer.write_record(table.headers())?;
        }
        for row in table.rows() {
            csv_writer.write_record(row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MeasurementTable {
        MeasurementTable::new(
            vec!["Well".into(), "Target".into(), "Content".into()],
            vec![vec!["A1".into(), "GUSB".into(), "0Gy D1, (n=3)".into()]],
        )
    }

    #[test]
    fn test_write_with_header() {
        let mut out = Vec::new();
        CsvWriter::write(&table(), &mut out, &CsvWriteOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Well,Target,Content\nA1,GUSB,\"0Gy D1, (n=3)\"\n"
        );
    }

    #[test]
    fn test_write_tab_separated_crlf_without_header() {
        let options = CsvWriteOptions {
            delimiter: b'\t',
            write_header: false,
            line_terminator: LineTerminator::CRLF,
            ..CsvWriteOptions::default()
        };
        let mut out = Vec::new();
        CsvWriter::write(&table(), &mut out, &options).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "A1\tGUSB\t0Gy D1, (n=3)\r\n"
        );
    }
}
