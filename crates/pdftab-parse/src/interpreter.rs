//! Content stream interpreter.
//!
//! Consumes operators from the [`Lexer`](crate::tokenizer::Lexer), maintains
//! the graphics and text state, and emits positioned text fragments and
//! stroked line segments in page coordinates. Unknown operators consume and
//! discard their arguments; a state operator with too few arguments is
//! skipped with a warning and extraction continues.

use std::collections::HashSet;

use pdftab_core::content::{LineSegment, TextFragment};
use pdftab_core::error::{ExtractError, ExtractWarning, ExtractWarningCode};
use pdftab_core::geometry::{Matrix, Point};
use pdftab_core::merge::LINE_TOLERANCE;
use pdftab_core::options::ExtractOptions;

use crate::error::StreamError;
use crate::font_widths::{measure_text, FontWidths};
use crate::graphics_state::GraphicsState;
use crate::text_state::TextState;
use crate::tokenizer::{Lexer, Operand, Operator};

/// Segments shorter than this are discarded at emission time.
pub const MIN_LINE_LENGTH: f64 = 10.0;

/// Everything the interpreter emitted for one content stream.
#[derive(Debug, Default)]
pub struct PageContent {
    /// Positioned text fragments in emission order.
    pub fragments: Vec<TextFragment>,
    /// Horizontal and vertical stroked segments in emission order.
    pub segments: Vec<LineSegment>,
    /// Non-fatal warnings collected while interpreting.
    pub warnings: Vec<ExtractWarning>,
    /// Number of operators dispatched.
    pub operator_count: usize,
    /// Set when the stream ended malformed; fragments and segments emitted
    /// before the error remain valid.
    pub stream_error: Option<ExtractError>,
}

/// Interpret a content stream, emitting fragments and segments.
///
/// A malformed tail does not fail the call: everything emitted up to the
/// error is returned alongside `stream_error`. A resource-limit violation
/// is fatal and returns `Err`; the page yields zero tables.
pub fn interpret_content_stream(
    stream: &[u8],
    widths: Option<&dyn FontWidths>,
    options: &ExtractOptions,
) -> Result<PageContent, ExtractError> {
    let mut lexer = Lexer::with_limits(stream, options.max_tokens, options.max_nesting_depth);
    let mut interp = Interpreter::new(widths, options);

    loop {
        match lexer.next_operator() {
            Ok(Some(op)) => interp.dispatch(&op),
            Ok(None) => break,
            Err(err @ StreamError::LimitExceeded { .. }) => return Err(err.into()),
            Err(err) => {
                interp.content.stream_error = Some(err.into());
                break;
            }
        }
    }

    Ok(interp.content)
}

/// One subpath of the current path.
#[derive(Debug, Clone)]
struct Subpath {
    points: Vec<Point>,
    closed: bool,
}

/// The current path under construction, cleared by any path-consuming
/// operator. The path is not part of the q/Q save stack.
#[derive(Debug, Default)]
struct PathBuilder {
    subpaths: Vec<Subpath>,
}

impl PathBuilder {
    /// `m` operator: start a new subpath.
    fn move_to(&mut self, p: Point) {
        self.subpaths.push(Subpath {
            points: vec![p],
            closed: false,
        });
    }

    /// `l` operator: append a straight segment to the current subpath.
    /// A lone `l` with no open subpath is ignored.
    fn line_to(&mut self, p: Point) {
        if let Some(sub) = self.subpaths.last_mut() {
            sub.points.push(p);
        }
    }

    /// `h` operator: close the current subpath.
    fn close(&mut self) {
        if let Some(sub) = self.subpaths.last_mut() {
            sub.closed = true;
        }
    }

    /// `re` operator: append a closed rectangular subpath.
    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.subpaths.push(Subpath {
            points: vec![
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x + w, y + h),
                Point::new(x, y + h),
            ],
            closed: true,
        });
    }

    fn clear(&mut self) {
        self.subpaths.clear();
    }
}

struct Interpreter<'a> {
    gstate: GraphicsState,
    tstate: TextState,
    path: PathBuilder,
    widths: Option<&'a dyn FontWidths>,
    options: &'a ExtractOptions,
    content: PageContent,
    /// Fonts already reported as unresolved, to warn once per font.
    missing_fonts: HashSet<String>,
}

impl<'a> Interpreter<'a> {
    fn new(widths: Option<&'a dyn FontWidths>, options: &'a ExtractOptions) -> Self {
        Self {
            gstate: GraphicsState::new(),
            tstate: TextState::new(),
            path: PathBuilder::default(),
            widths,
            options,
            content: PageContent::default(),
            missing_fonts: HashSet::new(),
        }
    }

    fn dispatch(&mut self, op: &Operator) {
        let index = self.content.operator_count;
        self.content.operator_count += 1;

        match op.name.as_str() {
            // --- Graphics state ---
            "q" => self.gstate.save_state(),
            "Q" => {
                self.gstate.restore_state();
            }
            "cm" => {
                if let Some([a, b, c, d, e, f]) = numbers(&op.operands) {
                    self.gstate.concat_matrix(a, b, c, d, e, f);
                } else {
                    self.warn_arity("cm", index);
                }
            }
            "w" => {
                if let Some([v]) = numbers(&op.operands) {
                    self.gstate.set_line_width(v);
                } else {
                    self.warn_arity("w", index);
                }
            }

            // --- Text state ---
            "BT" => self.tstate.begin_text(),
            "ET" => self.tstate.end_text(),
            "Tf" => match (op.operands.first(), number_at(&op.operands, 1)) {
                (Some(Operand::Name(name)), Some(size)) => {
                    self.tstate.set_font(name.clone(), size);
                }
                _ => self.warn_arity("Tf", index),
            },
            "Tm" => {
                if let Some([a, b, c, d, e, f]) = numbers(&op.operands) {
                    self.tstate.set_text_matrix(a, b, c, d, e, f);
                } else {
                    self.warn_arity("Tm", index);
                }
            }
            "Td" => {
                if let Some([tx, ty]) = numbers(&op.operands) {
                    self.tstate.move_text_position(tx, ty);
                } else {
                    self.warn_arity("Td", index);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers(&op.operands) {
                    self.tstate.move_text_position_and_set_leading(tx, ty);
                } else {
                    self.warn_arity("TD", index);
                }
            }
            "TL" => {
                if let Some([v]) = numbers(&op.operands) {
                    self.tstate.set_leading(v);
                } else {
                    self.warn_arity("TL", index);
                }
            }
            "T*" => self.tstate.move_to_next_line(),

            // --- Text showing ---
            "Tj" => match op.operands.first().and_then(string_bytes) {
                Some(bytes) => {
                    let bytes = bytes.to_vec();
                    self.show_text(&bytes);
                }
                None => self.warn_arity("Tj", index),
            },
            "TJ" => match op.operands.first() {
                Some(Operand::Array(elements)) => {
                    let elements = elements.clone();
                    self.show_text_array(&elements);
                }
                _ => self.warn_arity("TJ", index),
            },
            "'" => match op.operands.first().and_then(string_bytes) {
                Some(bytes) => {
                    let bytes = bytes.to_vec();
                    self.tstate.move_to_next_line();
                    self.show_text(&bytes);
                }
                None => self.warn_arity("'", index),
            },
            "\"" => {
                // aw ac (string) ": word/char spacing is not modeled, so
                // this reduces to newline + show.
                match op.operands.get(2).and_then(string_bytes) {
                    Some(bytes) => {
                        let bytes = bytes.to_vec();
                        self.tstate.move_to_next_line();
                        self.show_text(&bytes);
                    }
                    None => self.warn_arity("\"", index),
                }
            }

            // --- Path construction ---
            "m" => {
                if let Some([x, y]) = numbers(&op.operands) {
                    self.path.move_to(Point::new(x, y));
                } else {
                    self.warn_arity("m", index);
                }
            }
            "l" => {
                if let Some([x, y]) = numbers(&op.operands) {
                    self.path.line_to(Point::new(x, y));
                } else {
                    self.warn_arity("l", index);
                }
            }
            "h" => self.path.close(),
            "re" => {
                if let Some([x, y, w, h]) = numbers(&op.operands) {
                    self.path.rect(x, y, w, h);
                } else {
                    self.warn_arity("re", index);
                }
            }

            // --- Path painting ---
            "S" => self.stroke_path(),
            "s" => {
                self.path.close();
                self.stroke_path();
            }
            // Fills and no-ops consume the path without emitting segments.
            "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" | "n" => self.path.clear(),

            // Everything else (color, clipping, images, markers) is a no-op.
            _ => {}
        }
    }

    /// Show a string at the current text matrix and advance it.
    fn show_text(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let font_size = self.tstate.font_size;
        if font_size <= 0.0 {
            return;
        }

        let font_name = self.tstate.font_name.clone();
        let (advance, fell_back) = measure_text(bytes, &font_name, font_size, self.widths);
        if fell_back && self.missing_fonts.insert(font_name.clone()) {
            self.warn(ExtractWarning::with_code(
                ExtractWarningCode::MissingFont,
                format!("font /{font_name} has no width metrics; using approximation"),
            ));
        }

        let trm = self.tstate.text_matrix().concat(self.gstate.ctm());
        let origin = trm.transform_point(Point::new(0.0, 0.0));
        let end = trm.transform_point(Point::new(advance, 0.0));
        let advance_width = end.x - origin.x;

        if advance_width > 0.0 {
            self.content.fragments.push(TextFragment {
                text: decode_text(bytes),
                origin,
                advance_width,
                font_size,
                font_name,
            });
        }
        self.tstate.advance_text_position(advance);
    }

    /// Show a `TJ` array: strings emit fragments, numbers apply kerning as
    /// `-n/1000 × font size` to the running horizontal translation.
    fn show_text_array(&mut self, elements: &[Operand]) {
        for element in elements {
            match element {
                Operand::LiteralString(s) | Operand::HexString(s) => {
                    let bytes = s.clone();
                    self.show_text(&bytes);
                }
                Operand::Integer(n) => {
                    self.apply_kerning(*n as f64);
                }
                Operand::Real(n) => {
                    self.apply_kerning(*n);
                }
                _ => {}
            }
        }
    }

    fn apply_kerning(&mut self, n: f64) {
        let shift = -n / 1000.0 * self.tstate.font_size;
        self.tstate.advance_text_position(shift);
    }

    /// Stroke the current path: transform each adjacent point pair by the
    /// CTM, keep horizontal and vertical segments of sufficient length, and
    /// clear the path.
    fn stroke_path(&mut self) {
        let ctm = *self.gstate.ctm();
        let stroke_width = self.gstate.line_width();

        for subpath in &self.path.subpaths {
            let points = &subpath.points;
            for pair in points.windows(2) {
                emit_segment(pair[0], pair[1], &ctm, stroke_width, &mut self.content.segments);
            }
            if subpath.closed && points.len() > 2 {
                emit_segment(
                    points[points.len() - 1],
                    points[0],
                    &ctm,
                    stroke_width,
                    &mut self.content.segments,
                );
            }
        }
        self.path.clear();
    }

    fn warn_arity(&mut self, op: &str, index: usize) {
        self.warn(
            ExtractWarning::with_code(
                ExtractWarningCode::InvalidOperand,
                format!("operator {op} with missing or invalid operands; skipped"),
            )
            .at_operator(index),
        );
    }

    fn warn(&mut self, warning: ExtractWarning) {
        if self.options.collect_warnings {
            self.content.warnings.push(warning);
        }
    }
}

/// Transform a point pair through the CTM and emit it as a segment when it
/// is horizontal or vertical and at least [`MIN_LINE_LENGTH`] long.
fn emit_segment(a: Point, b: Point, ctm: &Matrix, stroke_width: f64, out: &mut Vec<LineSegment>) {
    let segment = LineSegment {
        start: ctm.transform_point(a),
        end: ctm.transform_point(b),
        stroke_width,
    };
    if segment.orientation(LINE_TOLERANCE).is_some() && segment.length() >= MIN_LINE_LENGTH {
        out.push(segment);
    }
}

/// Decode string bytes to text, mapping each byte to the matching Unicode
/// scalar (Latin-1). Raw bytes are carried through; no surrogate handling.
fn decode_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

// --- Operand extraction helpers ---

/// Extract exactly `N` leading numeric operands, or `None`.
fn numbers<const N: usize>(operands: &[Operand]) -> Option<[f64; N]> {
    if operands.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = number_at(operands, i)?;
    }
    Some(out)
}

fn number_at(operands: &[Operand], index: usize) -> Option<f64> {
    match operands.get(index)? {
        Operand::Integer(i) => Some(*i as f64),
        Operand::Real(f) => Some(*f),
        _ => None,
    }
}

fn string_bytes(operand: &Operand) -> Option<&[u8]> {
    match operand {
        Operand::LiteralString(s) | Operand::HexString(s) => Some(s),
        _ => None,
    }
}
