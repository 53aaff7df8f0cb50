//! Pluggable character-width lookup.
//!
//! The interpreter measures text with an approximate metric of 600/1000 of
//! the font size per byte. Callers that can resolve real font metrics (from
//! page resources) supply a [`FontWidths`] implementation; unresolved fonts
//! and codes fall back to the approximation.

/// Default glyph advance in thousandths of the font size (0.6 × font size).
pub const DEFAULT_GLYPH_WIDTH: f64 = 600.0;

/// Resolves a font resource name and byte code to a glyph advance width.
///
/// Widths are expressed in thousandths of the font size, matching the PDF
/// glyph-space convention. Returning `None` selects the approximate metric;
/// it is never an error.
pub trait FontWidths {
    /// Advance width for `code` in the font resource `font`, if known.
    fn glyph_width(&self, font: &str, code: u8) -> Option<f64>;
}

/// Measure a string's advance width in text-space units.
///
/// Each byte contributes its glyph width (or [`DEFAULT_GLYPH_WIDTH`]) scaled
/// by the font size. Returns the total and whether any lookup fell back to
/// the approximation while a resolver was present.
pub fn measure_text(
    bytes: &[u8],
    font: &str,
    font_size: f64,
    widths: Option<&dyn FontWidths>,
) -> (f64, bool) {
    let mut total = 0.0;
    let mut fell_back = false;
    for &code in bytes {
        let glyph = match widths {
            Some(resolver) => match resolver.glyph_width(font, code) {
                Some(w) => w,
                None => {
                    fell_back = true;
                    DEFAULT_GLYPH_WIDTH
                }
            },
            None => DEFAULT_GLYPH_WIDTH,
        };
        total += glyph / 1000.0 * font_size;
    }
    (total, fell_back)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedWidths(f64);

    impl FontWidths for FixedWidths {
        fn glyph_width(&self, _font: &str, _code: u8) -> Option<f64> {
            Some(self.0)
        }
    }

    struct NoWidths;

    impl FontWidths for NoWidths {
        fn glyph_width(&self, _font: &str, _code: u8) -> Option<f64> {
            None
        }
    }

    #[test]
    fn approximate_metric_without_resolver() {
        let (width, fell_back) = measure_text(b"Hello", "F1", 12.0, None);
        assert!((width - 5.0 * 7.2).abs() < 1e-9);
        assert!(!fell_back);
    }

    #[test]
    fn resolver_widths_are_used() {
        let widths = FixedWidths(500.0);
        let (width, fell_back) = measure_text(b"AB", "F1", 10.0, Some(&widths));
        assert!((width - 10.0).abs() < 1e-9);
        assert!(!fell_back);
    }

    #[test]
    fn unresolved_font_falls_back() {
        let widths = NoWidths;
        let (width, fell_back) = measure_text(b"A", "F9", 10.0, Some(&widths));
        assert!((width - 6.0).abs() < 1e-9);
        assert!(fell_back);
    }

    #[test]
    fn empty_string_measures_zero() {
        let (width, fell_back) = measure_text(b"", "F1", 12.0, None);
        assert_eq!(width, 0.0);
        assert!(!fell_back);
    }
}
