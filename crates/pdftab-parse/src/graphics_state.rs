//! Graphics state stack for the content stream interpreter.
//!
//! Implements the subset of the PDF graphics state model the table pipeline
//! needs: a stack of states managed by `q` (save) and `Q` (restore), CTM
//! concatenation via `cm`, and the stroke width set by `w`.

use pdftab_core::geometry::Matrix;

/// Interpreter-level graphics state: the CTM and stroke width, with the
/// save/restore stack behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    ctm: Matrix,
    line_width: f64,
    stack: Vec<SavedState>,
}

/// A snapshot saved by the `q` operator.
#[derive(Debug, Clone, PartialEq)]
struct SavedState {
    ctm: Matrix,
    line_width: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsState {
    /// Create a new state with identity CTM and the default stroke width.
    pub fn new() -> Self {
        Self {
            ctm: Matrix::identity(),
            line_width: 1.0,
            stack: Vec::new(),
        }
    }

    /// The current transformation matrix.
    pub fn ctm(&self) -> &Matrix {
        &self.ctm
    }

    /// The current stroke width.
    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    /// Current depth of the save stack.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// `q` operator: push the current state onto the stack.
    pub fn save_state(&mut self) {
        self.stack.push(SavedState {
            ctm: self.ctm,
            line_width: self.line_width,
        });
    }

    /// `Q` operator: restore the most recently saved state.
    ///
    /// Returns `false` if the stack is empty (unbalanced `Q`).
    pub fn restore_state(&mut self) -> bool {
        if let Some(saved) = self.stack.pop() {
            self.ctm = saved.ctm;
            self.line_width = saved.line_width;
            true
        } else {
            false
        }
    }

    /// `cm` operator: pre-multiply the CTM with the given matrix.
    pub fn concat_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        let m = Matrix::new(a, b, c, d, e, f);
        self.ctm = m.concat(&self.ctm);
    }

    /// `w` operator: set the stroke width.
    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdftab_core::geometry::Point;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-10,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn new_has_identity_ctm_and_default_width() {
        let state = GraphicsState::new();
        assert_eq!(*state.ctm(), Matrix::identity());
        assert_eq!(state.line_width(), 1.0);
        assert_eq!(state.stack_depth(), 0);
    }

    #[test]
    fn save_restore_round_trips() {
        let mut state = GraphicsState::new();
        state.save_state();
        state.concat_matrix(2.0, 0.0, 0.0, 2.0, 10.0, 20.0);
        state.set_line_width(3.0);
        assert_ne!(*state.ctm(), Matrix::identity());

        assert!(state.restore_state());
        assert_eq!(*state.ctm(), Matrix::identity());
        assert_eq!(state.line_width(), 1.0);
    }

    #[test]
    fn restore_on_empty_stack_returns_false() {
        let mut state = GraphicsState::new();
        assert!(!state.restore_state());
    }

    #[test]
    fn nested_save_restore() {
        let mut state = GraphicsState::new();
        state.set_line_width(2.0);
        state.save_state();
        state.set_line_width(4.0);
        state.save_state();
        state.set_line_width(8.0);

        assert!(state.restore_state());
        assert_eq!(state.line_width(), 4.0);
        assert!(state.restore_state());
        assert_eq!(state.line_width(), 2.0);
    }

    #[test]
    fn concat_matrix_translation() {
        let mut state = GraphicsState::new();
        state.concat_matrix(1.0, 0.0, 0.0, 1.0, 100.0, 200.0);
        let p = state.ctm().transform_point(Point::new(0.0, 0.0));
        assert_approx(p.x, 100.0);
        assert_approx(p.y, 200.0);
    }

    #[test]
    fn concat_matrix_is_cumulative() {
        let mut state = GraphicsState::new();
        state.concat_matrix(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        state.concat_matrix(1.0, 0.0, 0.0, 1.0, 10.0, 20.0);
        // Translate in the scaled system, then scale into page space.
        let p = state.ctm().transform_point(Point::new(0.0, 0.0));
        assert_approx(p.x, 20.0);
        assert_approx(p.y, 40.0);
    }
}
