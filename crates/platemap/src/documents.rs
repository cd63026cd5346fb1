//! Document-table input
//!
//! Tables extracted from a multi-page report by an external extractor are
//! exchanged as JSON: an array of tables, each an array of rows, each an
//! array of cells that are strings or `null`.
//!
//! ```json
//! [
//!   [["Well", "Fluor", "Cq"], ["A1", "SYBR", "21.3"]],
//!   [["Run Information", null], ["Operator", "HC"]]
//! ]
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use platemap_core::ExtractedTable;

use crate::convert::ConvertResult;

/// Parse document tables from JSON text
pub fn from_str(json: &str) -> ConvertResult<Vec<ExtractedTable>> {
    Ok(serde_json::from_str(json)?)
}

/// Parse document tables from a reader
pub fn from_reader<R: Read>(reader: R) -> ConvertResult<Vec<ExtractedTable>> {
    Ok(serde_json::from_reader(BufReader::new(reader))?)
}

/// Read document tables from a JSON file
pub fn read_file<P: AsRef<Path>>(path: P) -> ConvertResult<Vec<ExtractedTable>> {
    let file = File::open(path)?;
    from_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConvertError;

    #[test]
    fn test_null_cells() {
        let tables = from_str(r#"[[["Well", null], ["A1", "21.3"]], []]"#).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0][0], vec![Some("Well".to_string()), None]);
        assert!(tables[1].is_empty());
    }

    #[test]
    fn test_rejects_non_string_cells() {
        assert!(matches!(
            from_str(r#"[[["Well", 3]]]"#),
            Err(ConvertError::Json(_))
        ));
    }
}
