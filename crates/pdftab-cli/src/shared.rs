use std::io::{self, IsTerminal, Write};
use std::path::Path;

use pdftab::{ExtractOptions, Pdf};

use crate::page_range::parse_page_range;

/// Open a PDF file with user-friendly error messages.
///
/// Returns `Err(1)` with a message on stderr when the file is missing or
/// cannot be parsed as a valid PDF.
pub fn open_pdf(file: &Path, options: ExtractOptions) -> Result<Pdf, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    Pdf::open_file(file, Some(options)).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Resolve an optional page range string into 0-indexed page indices.
///
/// `None` selects all pages.
pub fn resolve_pages(pages: Option<&str>, page_count: usize) -> Result<Vec<usize>, i32> {
    match pages {
        Some(range) => parse_page_range(range, page_count).map_err(|e| {
            eprintln!("Error: {e}");
            1
        }),
        None => Ok((0..page_count).collect()),
    }
}

/// Escape a string for CSV output.
///
/// Fields containing commas, double quotes, or newlines are wrapped in
/// double quotes with internal quotes doubled.
pub fn csv_escape(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Prints "Processing page N/M..." to stderr, but only when stderr is a
/// terminal.
pub struct ProgressReporter {
    total: usize,
    is_tty: bool,
}

impl ProgressReporter {
    /// Create a reporter for `total` pages.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            is_tty: io::stderr().is_terminal(),
        }
    }

    /// Report progress for page `current` (1-indexed).
    pub fn report(&self, current: usize) {
        if self.is_tty {
            eprint!("\rProcessing page {}/{}...", current, self.total);
            let _ = io::stderr().flush();
        }
    }

    /// Clear the progress line.
    pub fn finish(&self) {
        if self.is_tty {
            eprint!("\r{}\r", " ".repeat(40));
            let _ = io::stderr().flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_escape_plain_text() {
        assert_eq!(csv_escape("hello"), "hello");
    }

    #[test]
    fn csv_escape_with_comma() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
    }

    #[test]
    fn csv_escape_with_quotes() {
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_escape_with_newline() {
        assert_eq!(csv_escape("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn csv_escape_empty() {
        assert_eq!(csv_escape(""), "");
    }

    #[test]
    fn open_pdf_missing_file() {
        let result = open_pdf(Path::new("/nonexistent/file.pdf"), ExtractOptions::default());
        assert_eq!(result.err(), Some(1));
    }

    #[test]
    fn resolve_pages_none_returns_all() {
        assert_eq!(resolve_pages(None, 3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn resolve_pages_invalid_range() {
        assert_eq!(resolve_pages(Some("0"), 3).unwrap_err(), 1);
    }
}
