use std::path::Path;

use pdftab::ExtractOptions;

use crate::shared::{open_pdf, resolve_pages};

pub fn run(file: &Path, pages: Option<&str>) -> Result<(), i32> {
    let pdf = open_pdf(file, ExtractOptions::default())?;
    let page_indices = resolve_pages(pages, pdf.page_count())?;

    println!("Pages: {}", pdf.page_count());

    for &index in &page_indices {
        match pdf.page_tables(index) {
            Ok(page) => {
                println!(
                    "Page {}: {} table(s), {} element(s), {} ruled line(s)",
                    index + 1,
                    page.metrics.tables_found,
                    page.metrics.element_count,
                    page.metrics.ruled_line_count,
                );
            }
            Err(err) => {
                println!("Page {}: error: {err}", index + 1);
            }
        }
    }
    Ok(())
}
