//! Well address type

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A well on a multi-well plate (e.g., "A1", "H12")
///
/// Wells use a run of row letters followed by a 1-based column number.
/// Row letters are stored upper-cased, so `"h12"` and `"H12"` are the same well.
/// No maximum plate size is assumed: `"Q48"` or `"AA3"` are valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WellAddress {
    /// Row letters, upper-case, never empty
    row: String,
    /// Column number, 1-based
    column: u32,
}

impl WellAddress {
    /// Create a well address from a row label and a column number
    ///
    /// The row is upper-cased; it must be non-empty and alphabetic, and the
    /// column must be at least 1.
    pub fn new<S: AsRef<str>>(row: S, column: u32) -> Result<Self> {
        let row = row.as_ref();
        if row.is_empty() || !row.chars().all(|c| c.is_ascii_alphabetic()) || column == 0 {
            return Err(Error::MalformedWell(format!("{}{}", row, column)));
        }
        Ok(Self {
            row: row.to_ascii_uppercase(),
            column,
        })
    }

    /// Build from parts already validated by a grid builder
    pub(crate) fn from_parts(row: String, column: u32) -> Self {
        Self { row, column }
    }

    /// Parse a well from its identifier
    ///
    /// # Examples
    /// ```
    /// use platemap_core::WellAddress;
    ///
    /// let well = WellAddress::parse("h12").unwrap();
    /// assert_eq!(well.row(), "H");
    /// assert_eq!(well.column(), 12);
    ///
    /// assert!(WellAddress::parse("A").is_err());
    /// assert!(WellAddress::parse("1A").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::MalformedWell(s.to_string()));
        }

        // Row letters
        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());
        if split == 0 {
            return Err(Error::MalformedWell(s.to_string()));
        }

        // Column number: digits only, so "+3" and "A-1" are rejected
        let digits = &s[split..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::MalformedWell(s.to_string()));
        }
        let column: u32 = digits
            .parse()
            .map_err(|_| Error::MalformedWell(s.to_string()))?;
        if column == 0 {
            return Err(Error::MalformedWell(s.to_string()));
        }

        Ok(Self {
            row: s[..split].to_ascii_uppercase(),
            column,
        })
    }

    /// Row letters (upper-case)
    pub fn row(&self) -> &str {
        &self.row
    }

    /// Column number (1-based)
    pub fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for WellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

impl FromStr for WellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
