//! Shared helpers for integration tests: content stream builders and a
//! minimal single-page PDF fixture generator.

#![allow(dead_code)]

/// One `BT .. Tj .. ET` block showing `text` at `(x, y)` in 12pt F1.
pub fn show(x: f64, y: f64, text: &str) -> String {
    format!("BT /F1 12 Tf 1 0 0 1 {x} {y} Tm ({text}) Tj ET\n")
}

/// A stroked line from `(x0, y0)` to `(x1, y1)`.
pub fn stroke(x0: f64, y0: f64, x1: f64, y1: f64) -> String {
    format!("{x0} {y0} m {x1} {y1} l S\n")
}

/// Rows of `(x, text)` cells at the given baselines, rendered as a stream.
pub fn grid_stream(rows: &[(f64, Vec<(f64, &str)>)]) -> String {
    let mut stream = String::new();
    for (y, cells) in rows {
        for (x, text) in cells {
            stream.push_str(&show(*x, *y, text));
        }
    }
    stream
}

/// The "Employee Information" page: header plus three data rows at
/// x = 50, 200, 280.
pub fn employee_stream() -> String {
    grid_stream(&[
        (700.0, vec![(50.0, "Name"), (200.0, "Age"), (280.0, "City")]),
        (
            680.0,
            vec![(50.0, "John Smith"), (200.0, "35"), (280.0, "New York")],
        ),
        (
            660.0,
            vec![(50.0, "Jane Doe"), (200.0, "28"), (280.0, "Los Angeles")],
        ),
        (
            640.0,
            vec![(50.0, "Bob Johnson"), (200.0, "42"), (280.0, "Chicago")],
        ),
    ])
}

/// Build a minimal one-page PDF embedding `content` as its content stream.
///
/// The page declares a widthless Type1 /F1 font, so extraction falls back
/// to the approximate metric.
pub fn build_pdf(content: &str) -> Vec<u8> {
    build_multi_page_pdf(&[content])
}

/// Build a PDF with one page per entry in `contents`, in order. All pages
/// share the same widthless Type1 /F1 font resource.
pub fn build_multi_page_pdf(contents: &[&str]) -> Vec<u8> {
    use lopdf::{Dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    let font_id = doc.add_object(Object::Dictionary(font));

    let mut font_map = Dictionary::new();
    font_map.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(font_map));
    let resources_id = doc.add_object(Object::Dictionary(resources));

    let mut kids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Object::Stream(Stream::new(
            Dictionary::new(),
            content.as_bytes().to_vec(),
        )));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Reference(resources_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );
        kids.push(Object::Reference(doc.add_object(Object::Dictionary(page))));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(kids.len() as i64));
    pages.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize fixture PDF");
    bytes
}
