/// A 2D point in page user space (origin at bottom-left, y grows upward).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (grows upward).
    pub y: f64,
}

impl Point {
    /// Create a point from its coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 2×3 affine transformation matrix.
///
/// Represented as six values `[a, b, c, d, e, f]` corresponding to:
/// ```text
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
/// ```
/// Point transformation: `(x', y') = (a*x + c*y + e, b*x + d*y + f)`
///
/// Used for both the current transformation matrix (CTM) and the text
/// matrix / text line matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// Create a new matrix with the given values.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Identity matrix (no transformation).
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// A pure translation by `(tx, ty)`.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: tx,
            f: ty,
        }
    }

    /// Transform a point through this matrix.
    pub fn transform_point(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }

    /// Concatenate this matrix with another: `self × other`.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// The matrix as a 6-element array `[a, b, c, d, e, f]`.
    pub fn as_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

/// Axis-aligned rectangle in page user space.
///
/// `(x, y)` is the bottom-left corner; y grows upward, matching the PDF
/// user-space convention preserved throughout the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from its bottom-left corner and extents.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Top edge (`y + height`).
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Compute the union of two rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let top = self.top().max(other.top());
        Rect {
            x,
            y,
            width: right - x,
            height: top - y,
        }
    }

    /// Whether `other` lies entirely within this rectangle, allowing the
    /// edges to extend past by up to `tolerance`.
    pub fn encloses(&self, other: &Rect, tolerance: f64) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.right() <= self.right() + tolerance
            && other.top() <= self.top() + tolerance
    }

    /// Whether a point lies within this rectangle, allowing `tolerance`
    /// past each edge.
    pub fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        p.x >= self.x - tolerance
            && p.x <= self.right() + tolerance
            && p.y >= self.y - tolerance
            && p.y <= self.top() + tolerance
    }
}
