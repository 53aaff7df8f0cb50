//! Backend-independent data types and algorithms for pdftab.
//!
//! This crate provides the geometric primitives, the positioned-content data
//! model, the fragment/segment merger, and the table reconstructor. It has no
//! required external dependencies — all functionality is pure Rust.
//!
//! # Modules
//!
//! - [`geometry`] — Geometric primitives: [`Point`], [`Matrix`], [`Rect`]
//! - [`content`] — Positioned content: [`TextFragment`], [`LineSegment`],
//!   [`TextElement`], [`RuledLine`]
//! - [`merge`] — Fragment merging and segment coalescing
//! - [`table`] — Table reconstruction: [`Table`], [`TableCell`], [`TableFinder`]
//! - [`options`] — Extraction options: [`ExtractOptions`], [`ProcessingMode`]
//! - [`error`] — Errors and warnings: [`ExtractError`], [`ExtractWarning`]
//! - [`metrics`] — Per-call result metadata: [`ExtractMetrics`]

#![deny(missing_docs)]

/// Positioned content types produced by interpretation and merging.
pub mod content;
/// Error and warning types for table extraction.
pub mod error;
/// Geometric primitives: Point, Matrix, Rect.
pub mod geometry;
/// Fragment merging and segment coalescing.
pub mod merge;
/// Per-call extraction metrics.
pub mod metrics;
/// Extraction options and processing mode presets.
pub mod options;
/// Table reconstruction from elements and ruled lines.
pub mod table;

pub use content::{LineSegment, Orientation, RuledLine, TextElement, TextFragment};
pub use error::{ExtractError, ExtractWarning, ExtractWarningCode};
pub use geometry::{Matrix, Point, Rect};
pub use merge::{coalesce_segments, merge_fragments};
pub use metrics::ExtractMetrics;
pub use options::{ExtractOptions, ProcessingMode};
pub use table::{RowScore, Table, TableCell, TableDetection, TableFinder};
