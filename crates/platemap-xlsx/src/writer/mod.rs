//! XLSX writer

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use platemap_core::MeasurementTable;
use tracing::debug;

use crate::error::{XlsxError, XlsxResult};

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const SHEET_PART: &str = "xl/worksheets/sheet1.xml";

/// Package parts that do not depend on the table
const STATIC_PARTS: [(&str, &str); 4] = [
    (
        "[Content_Types].xml",
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#,
    ),
    (
        "_rels/.rels",
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
    ),
    (
        "xl/_rels/workbook.xml.rels",
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#,
    ),
    // One font, the two mandatory fills, one border
    (
        "xl/styles.xml",
        r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#,
    ),
];

const WORKBOOK_XML: &str = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{sheet_name}" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKSHEET_HEAD: &str =
    r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#;

/// Store one part, deflated, with the XML declaration prepended
fn write_part<W: Write + Seek>(
    zip: &mut zip::ZipWriter<W>,
    name: &str,
    content: &str,
) -> XlsxResult<()> {
    zip.start_file(name, zip::write::SimpleFileOptions::default())?;
    zip.write_all(XML_DECL.as_bytes())?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

/// Options for [`XlsxWriter`]
#[derive(Debug, Clone)]
pub struct XlsxWriteOptions {
    /// Name of the single worksheet
    pub sheet_name: String,
    /// Store cells that read as plain decimal numbers as numeric cells
    pub infer_numbers: bool,
}

impl Default for XlsxWriteOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            infer_numbers: true,
        }
    }
}

/// XLSX file writer
///
/// Writes a measurement table as a single worksheet: the header row first,
/// then one worksheet row per table row.
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a table to a file path
    pub fn write_file<P: AsRef<Path>>(
        table: &MeasurementTable,
        path: P,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(table, file, options)
    }

    /// Write a table to a writer
    pub fn write<W: Write + Seek>(
        table: &MeasurementTable,
        writer: W,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<()> {
        validate_sheet_name(&options.sheet_name)?;

        let mut zip = zip::ZipWriter::new(writer);

        for (name, content) in STATIC_PARTS {
            write_part(&mut zip, name, content)?;
        }
        let workbook = WORKBOOK_XML.replace("{sheet_name}", &escape_xml(&options.sheet_name));
        write_part(&mut zip, "xl/workbook.xml", &workbook)?;
        Self::write_worksheet(&mut zip, table, options)?;

        zip.finish()?;
        debug!(rows = table.len(), columns = table.headers().len(), "wrote workbook");
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        table: &MeasurementTable,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<()> {
        let mut content = String::from(WORKSHEET_HEAD);

        let header = table.headers().iter().map(|h| (h.as_str(), false));
        Self::write_row(&mut content, 0, header);

        for (idx, row) in table.rows().iter().enumerate() {
            let cells = row
                .iter()
                .map(|v| (v.as_str(), options.infer_numbers && is_plain_number(v)));
            Self::write_row(&mut content, idx + 1, cells);
        }

        content.push_str("</sheetData></worksheet>");
        write_part(zip, SHEET_PART, &content)
    }

    /// Append one `<row>`; empty cells are left out
    fn write_row<'a, I>(content: &mut String, row: usize, cells: I)
    where
        I: Iterator<Item = (&'a str, bool)>,
    {
        let row = row + 1;
        content.push_str(&format!(r#"<row r="{}">"#, row));
        for (col, (value, numeric)) in cells.enumerate() {
            if value.is_empty() {
                continue;
            }
            let col = column_to_letters(col);
            let cell = if numeric {
                format!(r#"<c r="{}{}"><v>{}</v></c>"#, col, row, value.trim())
            } else {
                format!(
                    r#"<c r="{}{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    col,
                    row,
                    escape_xml(value)
                )
            };
            content.push_str(&cell);
        }
        content.push_str("</row>");
    }
}

fn validate_sheet_name(name: &str) -> XlsxResult<()> {
    if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(XlsxError::InvalidFormat(format!(
            "Sheet name must be 1 to {} characters: {:?}",
            MAX_SHEET_NAME_LEN, name
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
    {
        return Err(XlsxError::InvalidFormat(format!(
            "Sheet name {:?} contains invalid character '{}'",
            name, c
        )));
    }
    Ok(())
}

/// Check if text is a plain decimal number (`21.3`, `-4`, `0.05`)
///
/// Leading zeros (`007`), exponents, and surrounding text keep the cell a
/// string so identifiers survive unchanged.
fn is_plain_number(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if int_part.len() > 1 && int_part.starts_with('0') {
        return false;
    }
    match frac_part {
        Some(f) => !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}

/// Zero-based column index to letters (`0` -> `A`, `26` -> `AA`)
fn column_to_letters(col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
