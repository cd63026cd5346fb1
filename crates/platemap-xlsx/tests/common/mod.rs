//! In-memory workbook fixtures.

use std::io::{Cursor, Write};

/// Stylesheet with three theme-filled cell styles and one RGB-filled style
///
/// | s | fill                  |
/// |---|-----------------------|
/// | 0 | none                  |
/// | 1 | theme 4, tint 0.39998 |
/// | 2 | theme 5, tint -0.25   |
/// | 3 | theme 9               |
/// | 4 | rgb FFFFFF00          |
pub const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
  <fills count="6">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor theme="4" tint="0.39997558519241921"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="solid"><fgColor theme="5" tint="-0.249977111117893"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="solid"><fgColor theme="9"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="5">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="0" fillId="2" borderId="0" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="3" borderId="0" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="4" borderId="0" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="5" borderId="0" xfId="0" applyFill="1"/>
  </cellXfs>
</styleSheet>"#;

/// Build an xlsx archive from shared strings and the `<sheetData>` body of
/// its only worksheet
pub fn workbook(shared_strings: &[&str], sheet_data: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#).unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#).unwrap();

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Plate" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

        zip.start_file("xl/_rels/workbook.xml.rels", options)
            .unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#).unwrap();

        zip.start_file("xl/styles.xml", options).unwrap();
        zip.write_all(STYLES_XML.as_bytes()).unwrap();

        zip.start_file("xl/sharedStrings.xml", options).unwrap();
        let mut sst = format!(
            r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            shared_strings.len()
        );
        for s in shared_strings {
            sst.push_str(&format!("<si><t>{}</t></si>", s));
        }
        sst.push_str("</sst>");
        zip.write_all(sst.as_bytes()).unwrap();

        zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
        let sheet = format!(
            r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            sheet_data
        );
        zip.write_all(sheet.as_bytes()).unwrap();

        zip.finish().unwrap();
    }
    buf
}

/// Shared strings of [`plate_map_workbook`]
pub const PLATE_STRINGS: &[&str] = &["A", "0Gy D1 (n=3)", "2Gy D1 (n=3)", "GUSB", "TP53", "MDM2"];

/// A two-row, three-column plate map
///
/// ```text
///   |   | 1            | 2            | 3
/// 1 |   | 1            | 2            | 3
/// 2 | A | 0Gy D1 (s=1) | 0Gy D1 (s=2) |
/// 3 | b | 2Gy D1 (s=1) |              | 2Gy D1 (s=3)
/// 4 |   (absent: terminator)
/// 5 |   (absent: spacer)
/// 6 | GUSB (s=1) | TP53 (s=2) | MDM2 (s=3)
/// ```
pub fn plate_map_workbook() -> Vec<u8> {
    workbook(
        PLATE_STRINGS,
        r#"
<row r="1"><c r="B1"><v>1</v></c><c r="C1"><v>2</v></c><c r="D1"><v>3</v></c></row>
<row r="2"><c r="A2" t="s"><v>0</v></c><c r="B2" s="1" t="s"><v>1</v></c><c r="C2" s="2" t="s"><v>1</v></c><c r="D2"/></row>
<row r="3"><c r="A3" t="inlineStr"><is><t> b </t></is></c><c r="B3" s="1" t="s"><v>2</v></c><c r="D3" s="3" t="s"><v>2</v></c></row>
<row r="6"><c r="A6" s="1" t="s"><v>3</v></c><c r="B6" s="2" t="s"><v>4</v></c><c r="C6" s="3" t="s"><v>5</v></c></row>
"#,
    )
}
