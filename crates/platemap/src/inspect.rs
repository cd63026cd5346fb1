//! Plate-map summaries for diagnosing layout problems

use std::fmt;

use serde::Serialize;

use platemap_core::{LegendEntry, PlateMap, WellAddress};

/// One well of the plate with its resolved annotations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellSummary {
    pub well: WellAddress,
    pub target: Option<String>,
    pub content: Option<String>,
}

/// What a plate map resolved to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateMapSummary {
    /// Row labels in plate order
    pub rows: Vec<String>,
    /// Column numbers in plate order
    pub columns: Vec<u32>,
    /// Legend entries in sheet order
    pub legend: Vec<LegendEntry>,
    /// Every well of the extent, row-major
    pub wells: Vec<WellSummary>,
}

impl PlateMapSummary {
    pub fn new(plate_map: &PlateMap) -> Self {
        let content = plate_map.content();
        let targets = plate_map.targets();

        let wells = content
            .iter()
            .map(|(well, text)| WellSummary {
                target: targets.get(&well).cloned(),
                content: text.cloned(),
                well,
            })
            .collect();

        Self {
            rows: content.rows().to_vec(),
            columns: content.columns().to_vec(),
            legend: plate_map.legend().entries().to_vec(),
            wells,
        }
    }

    /// Number of wells holding content
    pub fn filled(&self) -> usize {
        self.wells.iter().filter(|w| w.content.is_some()).count()
    }
}

impl fmt::Display for PlateMapSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Grid: {} rows x {} columns ({} wells filled)",
            self.rows.len(),
            self.columns.len(),
            self.filled()
        )?;

        writeln!(f, "Legend:")?;
        for entry in &self.legend {
            writeln!(f, "  {:>6}  {}", entry.key.to_string(), entry.label)?;
        }

        writeln!(f, "Wells:")?;
        for well in self.wells.iter().filter(|w| w.content.is_some()) {
            writeln!(
                f,
                "  {:<4} {:<12} {}",
                well.well.to_string(),
                well.target.as_deref().unwrap_or(""),
                well.content.as_deref().unwrap_or("")
            )?;
        }
        Ok(())
    }
}
