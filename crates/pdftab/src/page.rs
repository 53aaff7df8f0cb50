//! Page-level extraction entry point.
//!
//! [`extract_tables`] is the single synchronous, side-effect-free call that
//! runs the whole pipeline over one content stream: interpret, merge,
//! reconstruct. Distinct pages share no state and may be processed in
//! parallel by the caller.

use std::time::Instant;

use pdftab_core::error::{ExtractError, ExtractWarning};
use pdftab_core::merge::{coalesce_segments, merge_fragments};
use pdftab_core::metrics::ExtractMetrics;
use pdftab_core::options::ExtractOptions;
use pdftab_core::table::{Table, TableFinder};
use pdftab_parse::interpreter::interpret_content_stream;
use pdftab_parse::font_widths::FontWidths;

/// Result of extracting tables from one page.
#[derive(Debug)]
pub struct PageTables {
    /// Tables found on the page, top-to-bottom.
    pub tables: Vec<Table>,
    /// Non-fatal warnings collected along the way.
    pub warnings: Vec<ExtractWarning>,
    /// Timing and counters for this call.
    pub metrics: ExtractMetrics,
    /// Set when the stream had a malformed tail. The tables recovered from
    /// the prefix before the error are still returned.
    pub stream_error: Option<ExtractError>,
}

/// Extract tables from a single page's content stream.
///
/// `resources` resolves font resource names to glyph widths; pass `None` to
/// use the approximate metric (0.6 × font size per byte) unconditionally.
///
/// # Errors
///
/// Only a resource-limit violation is fatal and yields zero tables. A
/// malformed stream tail is reported via [`PageTables::stream_error`] while
/// the tables reconstructed from the valid prefix are returned.
pub fn extract_tables(
    content_stream: &[u8],
    resources: Option<&dyn FontWidths>,
    options: &ExtractOptions,
) -> Result<PageTables, ExtractError> {
    let started = Instant::now();

    let content = interpret_content_stream(content_stream, resources, options)?;
    let fragment_count = content.fragments.len();
    let segment_count = content.segments.len();

    let elements = merge_fragments(content.fragments);
    let lines = coalesce_segments(content.segments);
    let element_count = elements.len();
    let ruled_line_count = lines.len();

    let detection = TableFinder::new(elements, lines, options.clone()).find_tables();

    let metrics = ExtractMetrics {
        duration: started.elapsed(),
        fragment_count,
        segment_count,
        element_count,
        ruled_line_count,
        tables_found: detection.tables.len(),
        tables_dropped: detection.dropped,
    };

    Ok(PageTables {
        tables: detection.tables,
        warnings: content.warnings,
        metrics,
        stream_error: content.stream_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(x: f64, y: f64, text: &str) -> String {
        format!("BT /F1 12 Tf 1 0 0 1 {x} {y} Tm ({text}) Tj ET\n")
    }

    #[test]
    fn pipeline_runs_end_to_end() {
        let mut stream = String::new();
        for (y, row) in [
            (700.0, ["Name", "Age", "City"]),
            (680.0, ["John Smith", "35", "New York"]),
            (660.0, ["Jane Doe", "28", "Los Angeles"]),
            (640.0, ["Bob Johnson", "42", "Chicago"]),
        ] {
            for (x, text) in [50.0, 200.0, 280.0].into_iter().zip(row) {
                stream.push_str(&show(x, y, text));
            }
        }

        let result =
            extract_tables(stream.as_bytes(), None, &ExtractOptions::default()).unwrap();
        assert_eq!(result.tables.len(), 1);
        assert!(result.stream_error.is_none());
        assert_eq!(result.metrics.fragment_count, 12);
        assert_eq!(result.metrics.element_count, 12);
        assert_eq!(result.metrics.tables_found, 1);
        assert_eq!(result.metrics.tables_dropped, 0);
    }

    #[test]
    fn empty_stream_yields_no_tables() {
        let result = extract_tables(b"", None, &ExtractOptions::default()).unwrap();
        assert!(result.tables.is_empty());
        assert_eq!(result.metrics.fragment_count, 0);
    }

    #[test]
    fn limit_violation_is_fatal() {
        let options = ExtractOptions {
            max_tokens: Some(1),
            ..ExtractOptions::default()
        };
        let result = extract_tables(b"1 0 0 1 50 700 Tm", None, &options);
        assert!(matches!(result, Err(ExtractError::LimitExceeded { .. })));
    }
}
