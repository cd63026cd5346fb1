//! Colour legend and colour-key resolution
//!
//! The legend row below the plate grid pairs each fill colour with a target
//! label. [`ColorLegend`] holds that mapping as a bijection: no two entries may
//! share a colour key, and no two entries may share a label.
//! [`ColorKeyResolver`] reads the legend row and rewrites a colour-key grid
//! into a target-label grid.

use std::fmt;

use ahash::AHashMap;
use tracing::debug;

use crate::color::ColorKey;
use crate::error::{Error, Result};
use crate::grid::PlateGrid;
use crate::sheet::{SheetCell, SheetMatrix};

/// Offset from the grid terminator row to the legend row
///
/// One blank spacer row separates the terminator from the legend.
pub const LEGEND_ROW_OFFSET: usize = 2;

/// Which side of the legend bijection was violated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegendConflict {
    /// Two entries share a colour key
    Key(ColorKey),
    /// Two entries share a label
    Label(String),
}

impl fmt::Display for LegendConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegendConflict::Key(key) => write!(f, "colour key {} used twice", key),
            LegendConflict::Label(label) => write!(f, "label {:?} used twice", label),
        }
    }
}

/// One legend entry
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegendEntry {
    pub key: ColorKey,
    pub label: String,
}

impl LegendEntry {
    pub fn new<S: Into<String>>(key: ColorKey, label: S) -> Self {
        Self {
            key,
            label: label.into(),
        }
    }
}

/// Bijective mapping between colour keys and target labels
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLegend {
    entries: Vec<LegendEntry>,
    by_key: AHashMap<ColorKey, usize>,
    by_label: AHashMap<String, usize>,
}

impl ColorLegend {
    /// Create a legend, rejecting duplicated keys or labels
    ///
    /// The error carries every key and label of the legend for diagnostics.
    pub fn new(entries: Vec<LegendEntry>) -> Result<Self> {
        let mut by_key = AHashMap::with_capacity(entries.len());
        let mut by_label = AHashMap::with_capacity(entries.len());

        for (idx, entry) in entries.iter().enumerate() {
            let conflict = if by_key.insert(entry.key, idx).is_some() {
                Some(LegendConflict::Key(entry.key))
            } else if by_label.insert(entry.label.clone(), idx).is_some() {
                Some(LegendConflict::Label(entry.label.clone()))
            } else {
                None
            };

            if let Some(conflict) = conflict {
                return Err(Error::DuplicateLegendEntry {
                    conflict,
                    keys: entries.iter().map(|e| e.key).collect(),
                    labels: entries.iter().map(|e| e.label.clone()).collect(),
                });
            }
        }

        Ok(Self {
            entries,
            by_key,
            by_label,
        })
    }

    /// Read a legend from a worksheet row
    ///
    /// Empty cells are skipped. Every labelled cell must carry a theme fill.
    /// `row` is the zero-based worksheet row, used in error reports.
    pub fn from_row(cells: &[SheetCell], row: usize) -> Result<Self> {
        let mut entries = Vec::new();
        for (column, cell) in cells.iter().enumerate() {
            let Some(label) = cell.text_value() else {
                continue;
            };
            let fill = cell.fill.ok_or(Error::MissingFill { row, column })?;
            entries.push(LegendEntry::new(fill.key(), label.trim()));
        }

        if entries.is_empty() {
            return Err(Error::EmptyLegendRow { row });
        }

        Self::new(entries)
    }

    /// Label for a colour key
    pub fn label(&self, key: ColorKey) -> Option<&str> {
        self.by_key
            .get(&key)
            .map(|&idx| self.entries[idx].label.as_str())
    }

    /// Colour key for a label
    pub fn key(&self, label: &str) -> Option<ColorKey> {
        self.by_label.get(label).map(|&idx| self.entries[idx].key)
    }

    /// Entries in legend order
    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite a colour-key grid into a label grid of the same shape
    pub fn resolve(&self, keys: &PlateGrid<ColorKey>) -> Result<PlateGrid<String>> {
        keys.try_map(|well, &key| {
            self.label(key)
                .map(str::to_string)
                .ok_or_else(|| Error::UnresolvedColorKey {
                    key,
                    well: well.clone(),
                })
        })
    }
}

/// Reads the legend row of a plate map and resolves colour keys to targets
pub struct ColorKeyResolver;

impl ColorKeyResolver {
    /// Read the legend row at `terminator + LEGEND_ROW_OFFSET`
    pub fn read_legend(matrix: &SheetMatrix, terminator: usize) -> Result<ColorLegend> {
        let row = terminator + LEGEND_ROW_OFFSET;
        let cells = matrix.row(row).ok_or(Error::MissingLegendRow { row })?;
        let legend = ColorLegend::from_row(cells, row)?;
        debug!(row, entries = legend.len(), "read colour legend");
        Ok(legend)
    }

    /// Read the legend and resolve a colour-key grid into a target grid
    pub fn resolve(
        matrix: &SheetMatrix,
        terminator: usize,
        keys: &PlateGrid<ColorKey>,
    ) -> Result<(ColorLegend, PlateGrid<String>)> {
        let legend = Self::read_legend(matrix, terminator)?;
        let targets = legend.resolve(keys)?;
        Ok((legend, targets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ThemeFill;
    use crate::grid::PlateGridBuilder;
    use crate::well::WellAddress;

    fn entry(theme: u32, tint: f64, label: &str) -> LegendEntry {
        LegendEntry::new(ColorKey::new(theme, tint), label)
    }

    #[test]
    fn test_lookup_both_ways() {
        let legend = ColorLegend::new(vec![
            entry(1, 0.0, "GUSB"),
            entry(5, 0.4, "CDKN1A"),
            entry(5, -0.25, "MDM2"),
        ])
        .unwrap();

        assert_eq!(legend.len(), 3);
        assert_eq!(legend.label(ColorKey::new(5, 0.39999)), Some("CDKN1A"));
        assert_eq!(legend.label(ColorKey::new(6, 0.0)), None);
        assert_eq!(legend.key("MDM2"), Some(ColorKey::new(5, -0.25)));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = ColorLegend::new(vec![
            entry(1, 0.0, "GUSB"),
            entry(1, 0.001, "TP53"),
        ])
        .unwrap_err();

        match err {
            Error::DuplicateLegendEntry {
                conflict,
                keys,
                labels,
            } => {
                assert_eq!(conflict, LegendConflict::Key(ColorKey::new(1, 0.0)));
                assert_eq!(keys.len(), 2);
                assert_eq!(labels, vec!["GUSB".to_string(), "TP53".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let err = ColorLegend::new(vec![entry(1, 0.0, "GUSB"), entry(4, 0.0, "GUSB")]).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateLegendEntry {
                conflict: LegendConflict::Label(ref label),
                ..
            } if label == "GUSB"
        ));
    }

    #[test]
    fn test_from_row_skips_empty_cells() {
        let cells = vec![
            SheetCell::empty(),
            SheetCell::filled("GUSB", ThemeFill::new(1, 0.0)),
            SheetCell::empty(),
            SheetCell::filled(" TP53 ", ThemeFill::new(7, 0.6)),
        ];
        let legend = ColorLegend::from_row(&cells, 12).unwrap();
        assert_eq!(
            legend.entries(),
            &[entry(1, 0.0, "GUSB"), entry(7, 0.6, "TP53")]
        );
    }

    #[test]
    fn test_from_row_errors() {
        assert_eq!(
            ColorLegend::from_row(&[SheetCell::empty(), SheetCell::empty()], 9).unwrap_err(),
            Error::EmptyLegendRow { row: 9 }
        );
        assert_eq!(
            ColorLegend::from_row(&[SheetCell::text("GUSB")], 9).unwrap_err(),
            Error::MissingFill { row: 9, column: 0 }
        );
    }

    #[test]
    fn test_resolve_grid() {
        let legend = ColorLegend::new(vec![entry(1, 0.0, "GUSB"), entry(4, 0.8, "TP53")]).unwrap();

        let mut builder = PlateGridBuilder::new(vec![1, 2]).unwrap();
        builder
            .push_row("A", vec![Some(ColorKey::new(1, 0.0)), None])
            .unwrap();
        builder
            .push_row("B", vec![None, Some(ColorKey::new(4, 0.8))])
            .unwrap();
        let keys = builder.build();

        let targets = legend.resolve(&keys).unwrap();
        assert!(keys.same_shape(&targets));
        let a1 = WellAddress::parse("A1").unwrap();
        let b2 = WellAddress::parse("B2").unwrap();
        assert_eq!(targets.get(&a1).map(String::as_str), Some("GUSB"));
        assert_eq!(targets.get(&b2).map(String::as_str), Some("TP53"));
    }

    #[test]
    fn test_resolve_unknown_key() {
        let legend = ColorLegend::new(vec![entry(1, 0.0, "GUSB")]).unwrap();
        let mut builder = PlateGridBuilder::new(vec![3]).unwrap();
        builder
            .push_row("C", vec![Some(ColorKey::new(9, 0.0))])
            .unwrap();

        assert_eq!(
            legend.resolve(&builder.build()).unwrap_err(),
            Error::UnresolvedColorKey {
                key: ColorKey::new(9, 0.0),
                well: WellAddress::parse("C3").unwrap(),
            }
        );
    }

    #[test]
    fn test_missing_legend_row() {
        let matrix = SheetMatrix::new(vec![vec![SheetCell::text("x")], vec![]]);
        assert_eq!(
            ColorKeyResolver::read_legend(&matrix, 1).unwrap_err(),
            Error::MissingLegendRow { row: 3 }
        );
    }
}
