//! Text state machine for the content stream interpreter.
//!
//! Implements text object tracking (BT/ET), font selection (Tf), the text
//! matrix and text line matrix (Tm), and the positioning operators
//! (Td, TD, TL, T*). Glyph advances move only the text matrix; the line
//! matrix records the start of the current line.

use pdftab_core::geometry::Matrix;

/// Text state parameters tracked during content stream interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    /// Current font resource name set by `Tf`.
    pub font_name: String,
    /// Current font size set by `Tf`.
    pub font_size: f64,
    /// Text leading set by `TL` or `TD`, used by `T*`.
    pub leading: f64,
    in_text_object: bool,
    text_matrix: Matrix,
    line_matrix: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}

impl TextState {
    /// Create a new text state with defaults per the format.
    pub fn new() -> Self {
        Self {
            font_name: String::new(),
            font_size: 0.0,
            leading: 0.0,
            in_text_object: false,
            text_matrix: Matrix::identity(),
            line_matrix: Matrix::identity(),
        }
    }

    /// Whether we are currently inside a BT/ET text object.
    pub fn in_text_object(&self) -> bool {
        self.in_text_object
    }

    /// The current text matrix.
    pub fn text_matrix(&self) -> &Matrix {
        &self.text_matrix
    }

    /// The current text line matrix.
    pub fn line_matrix(&self) -> &Matrix {
        &self.line_matrix
    }

    /// `BT` operator: begin a text object, resetting both matrices to
    /// identity.
    pub fn begin_text(&mut self) {
        self.text_matrix = Matrix::identity();
        self.line_matrix = Matrix::identity();
        self.in_text_object = true;
    }

    /// `ET` operator: end the text object.
    pub fn end_text(&mut self) {
        self.in_text_object = false;
    }

    /// `Tf` operator: set the font resource name and size.
    pub fn set_font(&mut self, font_name: String, font_size: f64) {
        self.font_name = font_name;
        self.font_size = font_size;
    }

    /// `TL` operator: set the text leading.
    pub fn set_leading(&mut self, leading: f64) {
        self.leading = leading;
    }

    /// `Tm` operator: set both the text matrix and the line matrix.
    pub fn set_text_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        let m = Matrix::new(a, b, c, d, e, f);
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td` operator: translate the line matrix by `(tx, ty)` and reset the
    /// text matrix to it.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD` operator: set leading to `-ty`, then `Td`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*` operator: move to the start of the next line using the current
    /// leading.
    pub fn move_to_next_line(&mut self) {
        let leading = self.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Advance the text matrix horizontally by `tx` text-space units after
    /// showing text. The line matrix is unchanged.
    pub fn advance_text_position(&mut self, tx: f64) {
        self.text_matrix = Matrix::translation(tx, 0.0).concat(&self.text_matrix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_matrix_approx(m: &Matrix, expected: [f64; 6]) {
        let actual = m.as_array();
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-10, "expected {expected:?}, got {actual:?}");
        }
    }

    #[test]
    fn new_defaults() {
        let ts = TextState::new();
        assert_eq!(ts.font_name, "");
        assert_eq!(ts.font_size, 0.0);
        assert_eq!(ts.leading, 0.0);
        assert!(!ts.in_text_object());
        assert_eq!(*ts.text_matrix(), Matrix::identity());
    }

    #[test]
    fn begin_text_resets_matrices() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position(100.0, 200.0);
        assert_ne!(*ts.text_matrix(), Matrix::identity());

        ts.begin_text();
        assert_eq!(*ts.text_matrix(), Matrix::identity());
        assert_eq!(*ts.line_matrix(), Matrix::identity());
    }

    #[test]
    fn font_persists_across_text_objects() {
        let mut ts = TextState::new();
        ts.set_font("F1".to_string(), 12.0);
        ts.begin_text();
        ts.end_text();
        ts.begin_text();
        assert_eq!(ts.font_name, "F1");
        assert_eq!(ts.font_size, 12.0);
    }

    #[test]
    fn td_translates_relative_to_line_matrix() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position(100.0, 700.0);
        ts.move_text_position(0.0, -14.0);
        assert_matrix_approx(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 100.0, 686.0]);
        assert_matrix_approx(ts.line_matrix(), [1.0, 0.0, 0.0, 1.0, 100.0, 686.0]);
    }

    #[test]
    fn td_after_tm_respects_scale() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.set_text_matrix(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        ts.move_text_position(50.0, 100.0);
        assert_matrix_approx(ts.text_matrix(), [2.0, 0.0, 0.0, 2.0, 100.0, 200.0]);
    }

    #[test]
    fn upper_td_sets_leading() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position_and_set_leading(0.0, -14.0);
        assert_eq!(ts.leading, 14.0);
        assert_matrix_approx(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 0.0, -14.0]);
    }

    #[test]
    fn t_star_uses_leading() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.set_leading(14.0);
        ts.move_text_position(72.0, 700.0);
        ts.move_to_next_line();
        assert_matrix_approx(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 72.0, 686.0]);
    }

    #[test]
    fn t_star_with_zero_leading_is_noop() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position(72.0, 700.0);
        ts.move_to_next_line();
        assert_matrix_approx(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 72.0, 700.0]);
    }

    #[test]
    fn advance_moves_text_matrix_only() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position(72.0, 700.0);
        ts.advance_text_position(10.0);
        assert_matrix_approx(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 82.0, 700.0]);
        assert_matrix_approx(ts.line_matrix(), [1.0, 0.0, 0.0, 1.0, 72.0, 700.0]);
    }

    #[test]
    fn advance_respects_text_matrix_scale() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.set_text_matrix(12.0, 0.0, 0.0, 12.0, 72.0, 700.0);
        ts.advance_text_position(10.0);
        assert_matrix_approx(ts.text_matrix(), [12.0, 0.0, 0.0, 12.0, 192.0, 700.0]);
    }

    #[test]
    fn tm_replaces_not_concatenates() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.set_text_matrix(2.0, 0.0, 0.0, 2.0, 100.0, 200.0);
        ts.set_text_matrix(1.0, 0.0, 0.0, 1.0, 50.0, 60.0);
        assert_matrix_approx(ts.text_matrix(), [1.0, 0.0, 0.0, 1.0, 50.0, 60.0]);
    }
}
