//! Document loader built on lopdf.
//!
//! [`Pdf`] opens a document, pulls each page's content stream bytes
//! (concatenating `/Contents` arrays with a newline separator), resolves
//! font widths from `/Resources/Font`, and drives the page-level pipeline.
//! Page failures are local: a broken page contributes zero tables and a
//! warning, never aborting the document.

use std::collections::HashMap;
use std::path::Path;

use pdftab_core::error::{ExtractError, ExtractWarning};
use pdftab_core::options::ExtractOptions;
use pdftab_core::table::Table;
use pdftab_parse::font_widths::FontWidths;

use crate::page::{extract_tables, PageTables};

/// Tables collected across a whole document, in ascending page order.
#[derive(Debug, Default)]
pub struct DocumentTables {
    /// All surviving tables with their 1-based page numbers attached.
    pub tables: Vec<Table>,
    /// Warnings from every page, including pages skipped due to errors.
    pub warnings: Vec<ExtractWarning>,
}

/// A PDF document opened for table extraction.
///
/// # Example
///
/// ```ignore
/// let pdf = Pdf::open(&bytes, None)?;
/// let document = pdf.extract_all();
/// for table in &document.tables {
///     println!("page {}: {} rows", table.page_number, table.row_count());
/// }
/// ```
pub struct Pdf {
    doc: lopdf::Document,
    page_ids: Vec<lopdf::ObjectId>,
    options: ExtractOptions,
}

impl Pdf {
    /// Open a PDF document from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ParseError`] if the bytes are not a valid
    /// PDF document.
    pub fn open(bytes: &[u8], options: Option<ExtractOptions>) -> Result<Self, ExtractError> {
        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| ExtractError::ParseError(e.to_string()))?;
        let page_ids: Vec<lopdf::ObjectId> = doc.get_pages().into_values().collect();
        Ok(Self {
            doc,
            page_ids,
            options: options.unwrap_or_default(),
        })
    }

    /// Open a PDF document from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::IoError`] if the file cannot be read, or
    /// [`ExtractError::ParseError`] if it is not a valid PDF.
    pub fn open_file(
        path: impl AsRef<Path>,
        options: Option<ExtractOptions>,
    ) -> Result<Self, ExtractError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::open(&bytes, options)
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Extract tables from one page (0-based index).
    ///
    /// # Errors
    ///
    /// Returns an error when the page cannot be located, its streams cannot
    /// be decoded, or a resource limit is exceeded.
    pub fn page_tables(&self, index: usize) -> Result<PageTables, ExtractError> {
        let page_id = *self
            .page_ids
            .get(index)
            .ok_or_else(|| ExtractError::ParseError(format!("page index {index} out of range")))?;

        let content = self.page_content(page_id)?;
        let widths = self.page_font_widths(page_id);

        let mut result = extract_tables(
            &content,
            widths.as_ref().map(|w| w as &dyn FontWidths),
            &self.options,
        )?;

        let page_number = index + 1;
        for table in &mut result.tables {
            table.page_number = page_number;
        }
        for warning in &mut result.warnings {
            if warning.page.is_none() {
                warning.page = Some(page_number);
            }
        }
        Ok(result)
    }

    /// Extract tables from every page in ascending page order.
    ///
    /// Lexer and interpreter errors are per-page local: a failing page
    /// contributes zero tables and a warning.
    pub fn extract_all(&self) -> DocumentTables {
        let mut document = DocumentTables::default();
        for index in 0..self.page_count() {
            self.collect_page(index, self.page_tables(index), &mut document);
        }
        document
    }

    /// Extract tables from all pages in parallel with rayon.
    ///
    /// Pages share no state; results are joined in ascending page order.
    #[cfg(feature = "parallel")]
    pub fn extract_all_parallel(&self) -> DocumentTables {
        use rayon::prelude::*;

        let results: Vec<Result<PageTables, ExtractError>> = (0..self.page_count())
            .into_par_iter()
            .map(|index| self.page_tables(index))
            .collect();

        let mut document = DocumentTables::default();
        for (index, result) in results.into_iter().enumerate() {
            self.collect_page(index, result, &mut document);
        }
        document
    }

    fn collect_page(
        &self,
        index: usize,
        result: Result<PageTables, ExtractError>,
        document: &mut DocumentTables,
    ) {
        let page_number = index + 1;
        match result {
            Ok(mut page) => {
                if let Some(err) = page.stream_error {
                    document.warnings.push(
                        ExtractWarning::new(format!("content stream ended early: {err}"))
                            .on_page(page_number),
                    );
                }
                document.warnings.append(&mut page.warnings);
                document.tables.append(&mut page.tables);
            }
            Err(err) => {
                document.warnings.push(
                    ExtractWarning::new(format!("page skipped: {err}")).on_page(page_number),
                );
            }
        }
    }

    /// Collect the page's content stream bytes. A `/Contents` array is
    /// concatenated with a single newline between streams.
    fn page_content(&self, page_id: lopdf::ObjectId) -> Result<Vec<u8>, ExtractError> {
        let dict = self
            .doc
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| ExtractError::ParseError(format!("invalid page object: {e}")))?;

        let Ok(contents) = dict.get(b"Contents") else {
            return Ok(Vec::new());
        };
        let contents = resolve_object(&self.doc, contents);

        let mut streams: Vec<Vec<u8>> = Vec::new();
        match contents {
            lopdf::Object::Array(items) => {
                for item in items {
                    let item = resolve_object(&self.doc, item);
                    if let Ok(stream) = item.as_stream() {
                        streams.push(decode_stream(stream)?);
                    }
                }
            }
            _ => {
                if let Ok(stream) = contents.as_stream() {
                    streams.push(decode_stream(stream)?);
                }
            }
        }

        Ok(streams.join(&b"\n"[..]))
    }

    /// Build a width resolver from the page's `/Resources/Font` dictionary,
    /// walking up the page tree for inherited resources. Returns `None`
    /// when the page declares no fonts, selecting the approximate metric.
    fn page_font_widths(&self, page_id: lopdf::ObjectId) -> Option<PageFontWidths> {
        let resources = self.resolve_inherited(page_id, b"Resources")?;
        let resources = resources.as_dict().ok()?;
        let fonts = resources.get(b"Font").ok()?;
        let fonts = resolve_object(&self.doc, fonts).as_dict().ok()?;

        let mut map = HashMap::new();
        for (name, font_obj) in fonts.iter() {
            let name = String::from_utf8_lossy(name).into_owned();
            let font_dict = match resolve_object(&self.doc, font_obj).as_dict() {
                Ok(d) => d,
                Err(_) => continue,
            };
            map.insert(name, self.simple_font_widths(font_dict));
        }

        if map.is_empty() {
            None
        } else {
            Some(PageFontWidths { fonts: map })
        }
    }

    /// Read `/FirstChar`, `/Widths`, and `/FontDescriptor/MissingWidth`
    /// from a simple font dictionary. Missing entries leave the resolver
    /// answering `None`, which selects the approximate metric.
    fn simple_font_widths(&self, font_dict: &lopdf::Dictionary) -> SimpleFontWidths {
        let first_char = font_dict
            .get(b"FirstChar")
            .ok()
            .and_then(object_to_f64)
            .map(|v| v as u32)
            .unwrap_or(0);

        let widths = font_dict
            .get(b"Widths")
            .ok()
            .map(|obj| resolve_object(&self.doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|o| object_to_f64(resolve_object(&self.doc, o)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        let missing_width = font_dict
            .get(b"FontDescriptor")
            .ok()
            .map(|obj| resolve_object(&self.doc, obj))
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|desc| desc.get(b"MissingWidth").ok())
            .and_then(object_to_f64);

        SimpleFontWidths {
            first_char,
            widths,
            missing_width,
        }
    }

    /// Look up a key on the page dictionary, walking `/Parent` links when
    /// the key is inherited from the page tree.
    fn resolve_inherited(&self, page_id: lopdf::ObjectId, key: &[u8]) -> Option<&lopdf::Object> {
        let mut current_id = page_id;
        loop {
            let dict = self.doc.get_object(current_id).and_then(|o| o.as_dict()).ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(resolve_object(&self.doc, value));
            }
            current_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
    }
}

impl std::fmt::Debug for Pdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pdf")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// Per-page font width resolver backed by `/Widths` arrays.
#[derive(Debug)]
pub struct PageFontWidths {
    fonts: HashMap<String, SimpleFontWidths>,
}

#[derive(Debug)]
struct SimpleFontWidths {
    first_char: u32,
    widths: Vec<f64>,
    missing_width: Option<f64>,
}

impl FontWidths for PageFontWidths {
    fn glyph_width(&self, font: &str, code: u8) -> Option<f64> {
        let entry = self.fonts.get(font)?;
        let width = (code as u32)
            .checked_sub(entry.first_char)
            .and_then(|index| entry.widths.get(index as usize).copied());
        width.or(entry.missing_width)
    }
}

/// Resolve an indirect reference, returning the referenced object.
/// A non-reference is returned as-is.
fn resolve_object<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Decode a PDF stream, decompressing when a filter is present.
fn decode_stream(stream: &lopdf::Stream) -> Result<Vec<u8>, ExtractError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| ExtractError::ParseError(format!("stream decompression failed: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
fn object_to_f64(obj: &lopdf::Object) -> Option<f64> {
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f64),
        lopdf::Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}
