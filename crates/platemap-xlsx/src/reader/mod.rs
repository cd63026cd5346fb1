//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{read_cell_fills, CellFills};
use platemap_core::{PlateMap, SheetCell, SheetMatrix};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' {
            result.push(c);
            continue;
        }

        let mut hex_chars = String::new();
        let mut decoded = None;
        let saw_x = chars.peek() == Some(&'x');

        if saw_x {
            chars.next();
            while hex_chars.len() < 4 {
                match chars.peek() {
                    Some(&ch) if ch.is_ascii_hexdigit() => {
                        hex_chars.push(ch);
                        chars.next();
                    }
                    _ => break,
                }
            }

            if hex_chars.len() == 4 && chars.peek() == Some(&'_') {
                chars.next();
                decoded = u32::from_str_radix(&hex_chars, 16)
                    .ok()
                    .and_then(char::from_u32);
            }
        }

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                // Not an escape sequence, keep what was consumed
                result.push('_');
                if saw_x {
                    result.push('x');
                    result.push_str(&hex_chars);
                }
            }
        }
    }

    result
}

/// Render a numeric cell value as text
///
/// Integral values print without a fractional part (`1.0` -> `"1"`), so
/// column headers stored as numbers read back as plain column numbers.
fn format_number(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
            format!("{}", n as i64)
        }
        Ok(n) if n.is_finite() => n.to_string(),
        _ => raw.to_string(),
    }
}

/// Convert column letters to a zero-based column index (`A` -> 0, `AA` -> 26)
fn letters_to_column(letters: &str) -> Option<usize> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut col = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(col - 1)
}

/// Parse an A1-style cell reference into zero-based (row, column)
fn parse_cell_ref(cell_ref: &str) -> Option<(usize, usize)> {
    let split = cell_ref.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell_ref.split_at(split);
    let col = letters_to_column(letters.trim_start_matches('$'))?;
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col))
}

/// Sparse cell collection for one worksheet
#[derive(Default)]
struct SheetBuilder {
    rows: Vec<Vec<SheetCell>>,
}

impl SheetBuilder {
    fn set(&mut self, row: usize, col: usize, cell: SheetCell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, SheetCell::empty);
        }
        cells[col] = cell;
    }

    fn build(self) -> SheetMatrix {
        SheetMatrix::new(self.rows)
    }
}

/// XML reader over one workbook part
fn xml_reader<R: Read>(part: R, trim_text: bool) -> Reader<BufReader<R>> {
    let mut xml = Reader::from_reader(BufReader::new(part));
    xml.trim_text(trim_text);
    xml
}

/// Unescaped value of an attribute
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read the first worksheet of a workbook file
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<SheetMatrix> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read the first worksheet of a workbook
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<SheetMatrix> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let fills = Self::read_styles(&mut archive)?;

        let (name, path) = Self::first_worksheet(&mut archive)?;
        let matrix = Self::read_worksheet(&mut archive, &path, &shared_strings, &fills)?;
        debug!(
            sheet = %name,
            rows = matrix.row_count(),
            columns = matrix.width(),
            "read worksheet"
        );
        Ok(matrix)
    }

    /// Read a workbook file and build the plate map from its first worksheet
    pub fn read_plate_map_file<P: AsRef<Path>>(path: P) -> XlsxResult<PlateMap> {
        let matrix = Self::read_file(path)?;
        Ok(PlateMap::from_sheet(&matrix)?)
    }

    /// Read a workbook and build the plate map from its first worksheet
    pub fn read_plate_map<R: Read + Seek>(reader: R) -> XlsxResult<PlateMap> {
        let matrix = Self::read(reader)?;
        Ok(PlateMap::from_sheet(&matrix)?)
    }

    /// Shared string table, empty when the part is absent
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();
        let Ok(part) = archive.by_name("xl/sharedStrings.xml") else {
            return Ok(strings);
        };
        let mut xml = xml_reader(part, false);
        let mut buf = Vec::new();

        let mut text = String::new();
        let mut in_item = false;
        let mut in_text = false;
        // <rPh> repeats the text as a reading aid
        let mut in_phonetic = false;

        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"si" => {
                        in_item = true;
                        text.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" => in_text = in_item && !in_phonetic,
                    _ => {}
                },
                Event::Empty(e) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Event::End(e) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&text));
                        in_item = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_text = false,
                    _ => {}
                },
                Event::Text(e) if in_text => text.push_str(&e.unescape()?),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<CellFills> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_cell_fills(file),
            Err(_) => Ok(CellFills::default()),
        }
    }

    /// Name and part path of the first worksheet in workbook order
    ///
    /// Chartsheets and other non-worksheet relationships are skipped.
    fn first_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<(String, String)> {
        const WORKBOOK: &str = "xl/workbook.xml";
        const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";

        let mut buf = Vec::new();

        // relationship id -> part path
        let mut worksheets: HashMap<String, String> = HashMap::new();
        {
            let part = archive
                .by_name(WORKBOOK_RELS)
                .map_err(|_| XlsxError::MissingPart(WORKBOOK_RELS.into()))?;
            let mut xml = xml_reader(part, true);
            loop {
                match xml.read_event_into(&mut buf)? {
                    Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"Relationship" => {
                        let is_sheet = attr(&e, b"Type")
                            .map_or(false, |t| t.ends_with("/worksheet"));
                        if let (true, Some(id), Some(target)) =
                            (is_sheet, attr(&e, b"Id"), attr(&e, b"Target"))
                        {
                            // Targets are relative to xl/ unless rooted
                            let path = match target.strip_prefix('/') {
                                Some(rooted) => rooted.to_string(),
                                None => format!("xl/{}", target),
                            };
                            worksheets.insert(id, path);
                        }
                    }
                    Event::Eof => break,
                    _ => {}
                }
                buf.clear();
            }
        }

        let part = archive
            .by_name(WORKBOOK)
            .map_err(|_| XlsxError::MissingPart(WORKBOOK.into()))?;
        let mut xml = xml_reader(part, true);
        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"sheet" => {
                    let found = attr(&e, b"r:id").and_then(|id| worksheets.remove(&id));
                    if let Some(path) = found {
                        let name = attr(&e, b"name").unwrap_or_default();
                        return Ok((name, path));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Err(XlsxError::NoWorksheet)
    }

    /// Read a worksheet into a cell matrix
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        shared_strings: &[String],
        fills: &CellFills,
    ) -> XlsxResult<SheetMatrix> {
        let part = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;
        // Keep whitespace inside <t> and <v>
        let mut xml = xml_reader(part, false);

        let mut buf = Vec::new();
        let mut sheet = SheetBuilder::default();

        // Position used for rows and cells written without an `r` attribute
        let mut next_row = 0usize;
        let mut current_row = 0usize;
        let mut next_col = 0usize;

        // Current cell state
        let mut current_pos: (usize, usize) = (0, 0);
        let mut current_cell_type: Option<String> = None;
        let mut current_cell_style: Option<u32> = None;
        let mut current_value: Option<String> = None;
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"row" => {
                        current_row = Self::row_index(&e).unwrap_or(next_row);
                        next_row = current_row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        in_cell = true;
                        current_value = None;
                        (current_pos, current_cell_type, current_cell_style) =
                            Self::cell_attrs(&e, current_row, next_col)?;
                        next_col = current_pos.1 + 1;
                    }
                    b"v" if in_cell => in_value = true,
                    b"is" if in_cell => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"row" => {
                        current_row = Self::row_index(&e).unwrap_or(next_row);
                        next_row = current_row + 1;
                    }
                    // Self-closing cell: no value, possibly a fill
                    b"c" => {
                        let ((row, col), _, style) = Self::cell_attrs(&e, current_row, next_col)?;
                        next_col = col + 1;
                        let fill = style.and_then(|s| fills.get(s));
                        if fill.is_some() {
                            sheet.set(row, col, SheetCell { value: None, fill });
                        }
                    }
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"c" => {
                        let value = Self::cell_text(
                            current_cell_type.as_deref(),
                            current_value.take(),
                            shared_strings,
                        )?;
                        let fill = current_cell_style.and_then(|s| fills.get(s));
                        if value.is_some() || fill.is_some() {
                            let (row, col) = current_pos;
                            sheet.set(row, col, SheetCell { value, fill });
                        }
                        in_cell = false;
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"t" if in_inline_str => in_inline_text = false,
                    _ => {}
                },
                Event::Text(e) if in_value || in_inline_text => {
                    let text = e.unescape()?;
                    // Rich inline strings arrive as several runs
                    match current_value.as_mut() {
                        Some(value) if in_inline_text => value.push_str(&text),
                        _ => current_value = Some(text.into_owned()),
                    }
                    if in_inline_text {
                        current_cell_type = Some("inlineStr".to_string());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet.build())
    }

    /// Zero-based index from a `<row r="..">` attribute
    fn row_index(e: &BytesStart<'_>) -> Option<usize> {
        attr(e, b"r")?.parse::<usize>().ok()?.checked_sub(1)
    }

    /// Position, type and style of a `<c>` element
    fn cell_attrs(
        e: &BytesStart<'_>,
        row: usize,
        next_col: usize,
    ) -> XlsxResult<((usize, usize), Option<String>, Option<u32>)> {
        let pos = match attr(e, b"r") {
            Some(cell_ref) => parse_cell_ref(&cell_ref).ok_or_else(|| {
                XlsxError::Parse(format!("Bad cell reference {:?}", cell_ref))
            })?,
            None => (row, next_col),
        };
        let style = attr(e, b"s").and_then(|s| s.parse::<u32>().ok());

        Ok((pos, attr(e, b"t"), style))
    }

    /// Displayed text of a cell from its type and raw `<v>` value
    ///
    /// Formula cells go through the same path: their `<v>` is the cached result.
    fn cell_text(
        cell_type: Option<&str>,
        value: Option<String>,
        shared_strings: &[String],
    ) -> XlsxResult<Option<String>> {
        let Some(value) = value else {
            return Ok(None);
        };

        let text = match cell_type {
            // Shared string
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Bad shared string index {:?}", value))
                })?;
                shared_strings
                    .get(idx)
                    .cloned()
                    .ok_or_else(|| {
                        XlsxError::Parse(format!("No shared string at index {}", idx))
                    })?
            }

            // Boolean
            Some("b") => {
                let truthy = value == "1" || value.eq_ignore_ascii_case("true");
                if truthy { "TRUE" } else { "FALSE" }.to_string()
            }

            // Inline or formula string
            Some("inlineStr") | Some("str") => decode_excel_escapes(&value),

            // Number (default type or explicit "n")
            None | Some("n") => format_number(&value),

            // Errors and unknown types keep their text
            Some(_) => value,
        };

        Ok(Some(text))
    }
}
