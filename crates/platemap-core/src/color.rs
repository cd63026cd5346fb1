//! Fill colour and colour key types

use std::fmt;

/// Theme fill colour of a worksheet cell
///
/// Theme indices follow the spreadsheet palette:
/// 0 = Background 1 (light)
/// 1 = Text 1 (dark)
/// 2 = Background 2
/// 3 = Text 2
/// 4-9 = Accent 1-6
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThemeFill {
    /// Theme colour index
    pub theme: u32,
    /// Tint modifier (-1.0 darkest to 1.0 lightest)
    pub tint: f64,
}

impl ThemeFill {
    /// Create a theme fill
    pub const fn new(theme: u32, tint: f64) -> Self {
        Self { theme, tint }
    }

    /// The colour key this fill maps to
    pub fn key(&self) -> ColorKey {
        ColorKey::from_fill(*self)
    }
}

/// A comparable scalar identifying a nominal fill colour
///
/// The key is `theme + round(tint, 2)`, stored as an exact count of
/// hundredths so that equal nominal colours compare equal and hash alike.
/// Rounding is half away from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorKey(i64);

impl ColorKey {
    /// Build a key from a theme index and a raw tint
    ///
    /// # Examples
    /// ```
    /// use platemap_core::ColorKey;
    ///
    /// assert_eq!(ColorKey::new(4, 0.3999755851924192), ColorKey::new(4, 0.4));
    /// assert_eq!(ColorKey::new(4, 0.4).to_string(), "4.40");
    /// ```
    ///
    /// Tints outside `-1.0..=1.0` are clamped; a non-finite tint counts as `0.0`.
    pub fn new(theme: u32, tint: f64) -> Self {
        let tint = if tint.is_finite() {
            tint.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        Self(i64::from(theme) * 100 + (tint * 100.0).round() as i64)
    }

    /// Build a key from a cell fill
    pub fn from_fill(fill: ThemeFill) -> Self {
        Self::new(fill.theme, fill.tint)
    }

    /// The key in hundredths
    pub fn hundredths(&self) -> i64 {
        self.0
    }

    /// The key as the `theme + tint` scalar
    pub fn value(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_nominal_colour_collapses() {
        // Tints as written by spreadsheet applications carry float noise
        assert_eq!(
            ColorKey::new(5, 0.59999389629810485),
            ColorKey::new(5, 0.6)
        );
        assert_eq!(
            ColorKey::new(9, -0.249977111117893),
            ColorKey::new(9, -0.25)
        );
        assert_eq!(ThemeFill::new(1, 0.0).key(), ColorKey::new(1, 0.0));
    }

    #[test]
    fn test_rounding_boundary() {
        // Either side of the 0.005 increment lands on a different hundredth
        assert_eq!(ColorKey::new(1, 0.004999).hundredths(), 100);
        assert_eq!(ColorKey::new(1, 0.005001).hundredths(), 101);
        assert_ne!(ColorKey::new(1, 0.004999), ColorKey::new(1, 0.005001));

        assert_eq!(ColorKey::new(1, 0.494999).hundredths(), 149);
        assert_eq!(ColorKey::new(1, 0.495001).hundredths(), 150);

        // Negative tints round away from zero as well
        assert_eq!(ColorKey::new(3, -0.004999).hundredths(), 300);
        assert_eq!(ColorKey::new(3, -0.005001).hundredths(), 299);
    }

    #[test]
    fn test_values_within_a_hundredth_collapse() {
        assert_eq!(ColorKey::new(2, 0.499999), ColorKey::new(2, 0.500001));
        assert_eq!(ColorKey::new(2, 0.499999).to_string(), "2.50");
    }

    #[test]
    fn test_scalar_combination() {
        // theme + tint is a single scalar, so different pairs can meet
        assert_eq!(ColorKey::new(1, -0.25), ColorKey::new(0, 0.75));
        assert!((ColorKey::new(4, 0.8).value() - 4.8).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_tint() {
        assert_eq!(ColorKey::new(4, 1e300), ColorKey::new(4, 1.0));
        assert_eq!(ColorKey::new(4, -1e300), ColorKey::new(4, -1.0));
        assert_eq!(ColorKey::new(4, f64::NAN), ColorKey::new(4, 0.0));
        assert_eq!(ColorKey::new(u32::MAX, f64::INFINITY).hundredths(), i64::from(u32::MAX) * 100);
    }

    #[test]
    fn test_display() {
        assert_eq!(ColorKey::new(1, 0.0).to_string(), "1.00");
        assert_eq!(ColorKey::new(0, -0.05).to_string(), "-0.05");
        assert_eq!(ColorKey::new(7, -0.5).to_string(), "6.50");
    }
}
