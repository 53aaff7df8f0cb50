//! Positioned page content produced by the content stream interpreter.
//!
//! [`TextFragment`] and [`LineSegment`] are the raw per-operator emissions;
//! [`TextElement`] and [`RuledLine`] are their merged forms produced by the
//! [`merge`](crate::merge) module and consumed by table reconstruction.

use crate::geometry::{Point, Rect};

/// A single positioned text emission from one `Tj` or one string element
/// of a `TJ` array, in page user-space coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextFragment {
    /// Decoded text content.
    pub text: String,
    /// Baseline origin of the first glyph.
    pub origin: Point,
    /// Total advance width of the fragment. Always positive.
    pub advance_width: f64,
    /// Font size in effect when the fragment was shown. Always positive.
    pub font_size: f64,
    /// Font resource name from the `Tf` operator (e.g. `"F1"`).
    pub font_name: String,
}

impl TextFragment {
    /// Right edge of the fragment (`origin.x + advance_width`).
    pub fn right(&self) -> f64 {
        self.origin.x + self.advance_width
    }
}

/// Orientation of a ruled line or stroked segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Constant y; spans along x.
    Horizontal,
    /// Constant x; spans along y.
    Vertical,
}

/// A stroked straight segment in page coordinates.
///
/// Only horizontal and vertical segments survive emission; diagonal strokes
/// are discarded by the interpreter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSegment {
    /// First endpoint.
    pub start: Point,
    /// Second endpoint.
    pub end: Point,
    /// Stroke width at the time of painting.
    pub stroke_width: f64,
}

impl LineSegment {
    /// Euclidean length of the segment.
    pub fn length(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Classify the segment as horizontal or vertical within `epsilon`.
    ///
    /// Returns `None` for diagonal segments.
    pub fn orientation(&self, epsilon: f64) -> Option<Orientation> {
        if (self.end.y - self.start.y).abs() < epsilon {
            Some(Orientation::Horizontal)
        } else if (self.end.x - self.start.x).abs() < epsilon {
            Some(Orientation::Vertical)
        } else {
            None
        }
    }
}

/// A logical text element: one or more fragments merged along a baseline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextElement {
    /// Concatenated text of the merged fragments.
    pub text: String,
    /// Left edge (baseline origin x of the first fragment).
    pub x: f64,
    /// Baseline y coordinate.
    pub y: f64,
    /// Total width spanned by the merged fragments.
    pub width: f64,
    /// Font size shared by the merged fragments.
    pub font_size: f64,
    /// Font resource name shared by the merged fragments.
    pub font_name: String,
}

impl TextElement {
    /// Build an element from a single fragment.
    pub fn from_fragment(fragment: TextFragment) -> Self {
        Self {
            text: fragment.text,
            x: fragment.origin.x,
            y: fragment.origin.y,
            width: fragment.advance_width,
            font_size: fragment.font_size,
            font_name: fragment.font_name,
        }
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Horizontal center of the element.
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Element height equals the font size.
    pub fn height(&self) -> f64 {
        self.font_size
    }

    /// Bounding rectangle with the baseline as the bottom edge.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.font_size)
    }
}

/// A logical ruled line: the maximal coalesced form of collinear stroked
/// segments, considered as table structure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuledLine {
    /// Whether the line is horizontal or vertical.
    pub orientation: Orientation,
    /// The fixed coordinate: y for horizontal lines, x for vertical lines.
    pub axis: f64,
    /// Start of the span along the orthogonal axis (`lo <= hi`).
    pub lo: f64,
    /// End of the span along the orthogonal axis.
    pub hi: f64,
    /// Stroke width (the widest of the coalesced segments).
    pub stroke_width: f64,
}

impl RuledLine {
    /// Length of the span along the orthogonal axis.
    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(x0: f64, y0: f64, x1: f64, y1: f64) -> LineSegment {
        LineSegment {
            start: Point::new(x0, y0),
            end: Point::new(x1, y1),
            stroke_width: 1.0,
        }
    }

    // --- LineSegment classification ---

    #[test]
    fn horizontal_segment_classified() {
        let s = segment(0.0, 100.0, 200.0, 100.5);
        assert_eq!(s.orientation(2.0), Some(Orientation::Horizontal));
    }

    #[test]
    fn vertical_segment_classified() {
        let s = segment(50.0, 0.0, 50.5, 300.0);
        assert_eq!(s.orientation(2.0), Some(Orientation::Vertical));
    }

    #[test]
    fn diagonal_segment_rejected() {
        let s = segment(0.0, 0.0, 100.0, 100.0);
        assert_eq!(s.orientation(2.0), None);
    }

    #[test]
    fn tiny_segment_is_both_but_horizontal_wins() {
        // Degenerate short segments classify as horizontal first.
        let s = segment(0.0, 0.0, 1.0, 1.0);
        assert_eq!(s.orientation(2.0), Some(Orientation::Horizontal));
    }

    #[test]
    fn segment_length() {
        let s = segment(0.0, 0.0, 3.0, 4.0);
        assert!((s.length() - 5.0).abs() < 1e-10);
    }

    // --- TextElement ---

    #[test]
    fn element_from_fragment() {
        let f = TextFragment {
            text: "Hi".to_string(),
            origin: Point::new(72.0, 700.0),
            advance_width: 14.4,
            font_size: 12.0,
            font_name: "F1".to_string(),
        };
        let e = TextElement::from_fragment(f);
        assert_eq!(e.text, "Hi");
        assert_eq!(e.x, 72.0);
        assert_eq!(e.y, 700.0);
        assert!((e.right() - 86.4).abs() < 1e-10);
        assert!((e.center_x() - 79.2).abs() < 1e-10);
        assert_eq!(e.height(), 12.0);
    }

    #[test]
    fn element_bounds_sits_on_baseline() {
        let e = TextElement {
            text: "x".to_string(),
            x: 10.0,
            y: 500.0,
            width: 7.2,
            font_size: 12.0,
            font_name: "F1".to_string(),
        };
        let b = e.bounds();
        assert_eq!(b.y, 500.0);
        assert_eq!(b.top(), 512.0);
    }

    // --- RuledLine ---

    #[test]
    fn ruled_line_span() {
        let l = RuledLine {
            orientation: Orientation::Horizontal,
            axis: 640.0,
            lo: 50.0,
            hi: 350.0,
            stroke_width: 0.5,
        };
        assert_eq!(l.span(), 300.0);
    }
}
