//! pdftab: reconstruct tabular structure from PDF content streams.
//!
//! The pipeline operates directly on content streams, with no rasterization
//! and no OCR. A lexer turns the bytes into operators, an interpreter replays the
//! graphics/text state to recover positioned text fragments and stroked
//! lines, a merger collapses them into logical elements, and a spatial
//! analyzer reconstructs row/column grids with merged-cell annotations and
//! confidence scores.
//!
//! Use [`extract_tables`] when you already hold a page's content stream
//! bytes, or [`Pdf`] to open a document and drive every page:
//!
//! ```ignore
//! use pdftab::{ExtractOptions, Pdf};
//!
//! let pdf = Pdf::open_file("report.pdf", None)?;
//! for table in pdf.extract_all().tables {
//!     println!("page {} has a {}×{} table (confidence {:.2})",
//!         table.page_number, table.row_count(), table.col_count(),
//!         table.confidence);
//! }
//! ```

pub mod document;
pub mod page;

pub use document::{DocumentTables, Pdf};
pub use page::{extract_tables, PageTables};
pub use pdftab_core::{
    ExtractError, ExtractMetrics, ExtractOptions, ExtractWarning, ExtractWarningCode,
    ProcessingMode, Rect, RuledLine, Table, TableCell, TextElement,
};
pub use pdftab_parse::{FontWidths, DEFAULT_GLYPH_WIDTH};
