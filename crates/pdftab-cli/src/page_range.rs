/// Parse a page range string like "1,3-5" into a sorted list of 0-indexed
/// page numbers.
///
/// Input is 1-indexed (user-facing); output is 0-indexed (internal).
/// Returns an error for page 0, malformed numbers, or pages beyond the
/// document's page count.
pub fn parse_page_range(input: &str, page_count: usize) -> Result<Vec<usize>, String> {
    let mut pages = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start = parse_page(start, page_count)?;
            let end = parse_page(end, page_count)?;
            pages.extend((start..=end).map(|p| p - 1));
        } else {
            pages.push(parse_page(part, page_count)? - 1);
        }
    }

    pages.sort();
    pages.dedup();
    Ok(pages)
}

/// Parse and validate a single 1-indexed page number.
fn parse_page(text: &str, page_count: usize) -> Result<usize, String> {
    let page: usize = text
        .trim()
        .parse()
        .map_err(|_| format!("invalid page number: '{}'", text.trim()))?;
    if page == 0 {
        return Err("page 0 is invalid (pages start at 1)".to_string());
    }
    if page > page_count {
        return Err(format!(
            "page {page} exceeds document page count ({page_count})"
        ));
    }
    Ok(page)
}
