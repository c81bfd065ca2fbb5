//! Pixel values, as written to and read from style properties.
//!
//! Style values are plain strings on every host: `300.0` becomes `"300px"`,
//! `1.5` becomes `"1.5px"`.

use std::fmt;

/// A length in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Px(pub f64);

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// Formats `value` as a pixel string.
pub fn px(value: f64) -> String {
    Px(value).to_string()
}

/// Parses a pixel string like `"300px"`.
///
/// Returns `None` for anything else, including unitless numbers.
pub fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim_end().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_a_stylesheet() {
        assert_eq!(px(300.0), "300px");
        assert_eq!(px(1.5), "1.5px");
        assert_eq!(px(0.0), "0px");
        assert_eq!(px(-20.0), "-20px");
    }

    #[test]
    fn parses_pixel_strings() {
        assert_eq!(parse_px("300px"), Some(300.0));
        assert_eq!(parse_px(" 12.25px "), Some(12.25));
        assert_eq!(parse_px("300"), None);
        assert_eq!(parse_px("3em"), None);
        assert_eq!(parse_px(""), None);
    }
}
