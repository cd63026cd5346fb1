//! Plate-map workbook fixtures written to temporary directories.

use std::io::Write;
use std::path::{Path, PathBuf};

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
  <fills count="4">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor theme="1"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="solid"><fgColor theme="5" tint="0.59999389629810485"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="0" fillId="2" borderId="0" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="3" borderId="0" xfId="0" applyFill="1"/>
  </cellXfs>
</styleSheet>"#;

/// Plate map with two rows and two columns
///
/// ```text
///   |   | 1                    | 2
/// 1 |   | 1                    | 2
/// 2 | A | 0Gy D1 (n=3) [GUSB]  | 0Gy D1 (n=3) [TP53]
/// 3 | B | 2Gy D1 (n=3) [TP53]  |
/// 4 |   (terminator)
/// 5 |   (spacer)
/// 6 | GUSB [theme 1] | TP53 [theme 5, tint 0.6]
/// ```
const SHEET_DATA: &str = r#"
<row r="1"><c r="B1"><v>1</v></c><c r="C1"><v>2</v></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>A</t></is></c><c r="B2" s="1" t="inlineStr"><is><t>0Gy D1 (n=3)</t></is></c><c r="C2" s="2" t="inlineStr"><is><t>0Gy D1 (n=3)</t></is></c></row>
<row r="3"><c r="A3" t="inlineStr"><is><t>B</t></is></c><c r="B3" s="2" t="inlineStr"><is><t>2Gy D1 (n=3)</t></is></c></row>
<row r="6"><c r="A6" s="1" t="inlineStr"><is><t>GUSB</t></is></c><c r="B6" s="2" t="inlineStr"><is><t>TP53</t></is></c></row>
"#;

/// Write the fixture plate map into `dir`
pub fn write_plate_map(dir: &Path) -> PathBuf {
    let path = dir.join("plate.xlsx");
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Plate" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

    zip.start_file("xl/_rels/workbook.xml.rels", options)
        .unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#).unwrap();

    zip.start_file("xl/styles.xml", options).unwrap();
    zip.write_all(STYLES_XML.as_bytes()).unwrap();

    zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
    let sheet = format!(
        r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
        SHEET_DATA
    );
    zip.write_all(sheet.as_bytes()).unwrap();

    zip.finish().unwrap();
    path
}

/// Write a text file into `dir`
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
