//! Cell fill resolution from `xl/styles.xml`
//!
//! Only the part of the stylesheet that carries fill colours is read: the
//! `fills` list and the `cellXfs` records pointing into it. A cell's `s`
//! attribute indexes `cellXfs`; the record's `fillId` indexes `fills`.

use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use platemap_core::ThemeFill;

use crate::error::{XlsxError, XlsxResult};

/// Theme fill per `cellXfs` index (`None` for cells without a theme fill)
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CellFills {
    fills: Vec<Option<ThemeFill>>,
}

impl CellFills {
    /// Theme fill for a cell style index
    pub(crate) fn get(&self, style_idx: u32) -> Option<ThemeFill> {
        self.fills.get(style_idx as usize).copied().flatten()
    }

    pub(crate) fn len(&self) -> usize {
        self.fills.len()
    }
}

pub(crate) fn read_cell_fills<R: Read>(reader: R) -> XlsxResult<CellFills> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    // Theme foreground colour of every <fill> in <fills>
    let mut fills: Vec<Option<ThemeFill>> = Vec::new();
    let mut cell_xfs: Vec<Option<ThemeFill>> = Vec::new();

    let mut in_fills = false;
    let mut in_fill = false;
    let mut current_fg: Option<ThemeFill> = None;
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"fills" => in_fills = true,
                b"fill" if in_fills => {
                    in_fill = true;
                    current_fg = None;
                }
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => {
                    cell_xfs.push(xf_fill(&e, &fills));
                }
                _ => {}
            },

            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"fgColor" if in_fill => {
                    current_fg = parse_theme_color(&e)?;
                }
                // <fill/> with nothing inside
                b"fill" if in_fills => fills.push(None),
                b"xf" if in_cell_xfs => {
                    cell_xfs.push(xf_fill(&e, &fills));
                }
                _ => {}
            },

            Ok(Event::End(e)) => match e.name().as_ref() {
                b"fill" if in_fill => {
                    fills.push(current_fg.take());
                    in_fill = false;
                }
                b"fills" => in_fills = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },

            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }

        buf.clear();
    }

    Ok(CellFills { fills: cell_xfs })
}

/// Fill of one `<xf>` record, resolved through its `fillId`
fn xf_fill(e: &BytesStart<'_>, fills: &[Option<ThemeFill>]) -> Option<ThemeFill> {
    let fill_id = e
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"fillId")
        .and_then(|attr| attr.unescape_value().ok()?.parse::<usize>().ok())
        .unwrap_or(0);
    fills.get(fill_id).copied().flatten()
}

/// `{theme, tint}` of a colour element, if it names a theme colour
///
/// A tint that is not a number in `-1.0..=1.0` is an error.
fn parse_theme_color(e: &BytesStart<'_>) -> XlsxResult<Option<ThemeFill>> {
    let mut theme: Option<u32> = None;
    let mut tint = 0.0;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"theme" => {
                theme = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok());
            }
            b"tint" => {
                let raw = attr.unescape_value()?;
                tint = raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|t| (-1.0..=1.0).contains(t))
                    .ok_or_else(|| XlsxError::Parse(format!("Bad fill tint {:?}", raw)))?;
            }
            _ => {}
        }
    }

    Ok(theme.map(|index| ThemeFill::new(index, tint)))
}
