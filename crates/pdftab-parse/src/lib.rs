//! pdftab-parse: PDF content-stream lexer and interpreter.
//!
//! This crate turns a content-stream byte buffer into positioned text
//! fragments and stroked line segments in page coordinates. It depends on
//! `pdftab-core` for the shared data types; the table reconstruction itself
//! lives there.

pub mod error;
pub mod font_widths;
pub mod graphics_state;
pub mod interpreter;
pub mod text_state;
pub mod tokenizer;

pub use error::StreamError;
pub use font_widths::{measure_text, FontWidths, DEFAULT_GLYPH_WIDTH};
pub use graphics_state::GraphicsState;
pub use interpreter::{interpret_content_stream, PageContent, MIN_LINE_LENGTH};
pub use pdftab_core;
pub use text_state::TextState;
pub use tokenizer::{tokenize, Lexer, Operand, Operator};
