use std::path::Path;

use pdftab::{ExtractOptions, ProcessingMode, Table};

use crate::cli::{Mode, OutputFormat};
use crate::shared::{csv_escape, open_pdf, resolve_pages, ProgressReporter};

/// Options for the tables subcommand, resolved from CLI flags.
pub struct TablesArgs<'a> {
    pub file: &'a Path,
    pub pages: Option<&'a str>,
    pub format: OutputFormat,
    pub mode: Mode,
    pub min_confidence: Option<f64>,
    pub min_rows: Option<usize>,
    pub min_cols: Option<usize>,
    pub no_merge_cells: bool,
}

pub fn run(args: &TablesArgs<'_>) -> Result<(), i32> {
    let options = build_options(args);
    let pdf = open_pdf(args.file, options)?;
    let page_indices = resolve_pages(args.pages, pdf.page_count())?;
    let progress = ProgressReporter::new(page_indices.len());

    let mut tables = Vec::new();
    for (i, &index) in page_indices.iter().enumerate() {
        progress.report(i + 1);
        match pdf.page_tables(index) {
            Ok(page) => {
                if let Some(err) = page.stream_error {
                    eprintln!("Warning: page {}: {err}", index + 1);
                }
                tables.extend(page.tables);
            }
            Err(err) => {
                eprintln!("Warning: page {} skipped: {err}", index + 1);
            }
        }
    }
    progress.finish();

    match args.format {
        OutputFormat::Text => write_grid(&tables),
        OutputFormat::Json => write_json(&tables),
        OutputFormat::Csv => write_csv(&tables),
    }
    Ok(())
}

/// Resolve the mode preset, then apply explicit flag overrides.
fn build_options(args: &TablesArgs<'_>) -> ExtractOptions {
    let mode = match args.mode {
        Mode::Fast => ProcessingMode::Fast,
        Mode::Balanced => ProcessingMode::Balanced,
        Mode::Accurate => ProcessingMode::Accurate,
    };
    let mut options = ExtractOptions::for_mode(mode);

    if let Some(threshold) = args.min_confidence {
        options.confidence_threshold = threshold;
    }
    if let Some(min_rows) = args.min_rows {
        options.min_rows = min_rows;
    }
    if let Some(min_cols) = args.min_cols {
        options.min_cols = min_cols;
    }
    if args.no_merge_cells {
        options.cell_merging = false;
    }
    options
}

fn write_grid(tables: &[Table]) {
    if tables.is_empty() {
        println!("No tables found.");
        return;
    }

    for (n, table) in tables.iter().enumerate() {
        println!(
            "--- Table {} (page {}, confidence {:.2}) ---",
            n + 1,
            table.page_number,
            table.confidence,
        );

        let col_count = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut col_widths = vec![1usize; col_count];
        for row in &table.rows {
            for (ci, cell) in row.iter().enumerate() {
                col_widths[ci] = col_widths[ci].max(cell.text.len());
            }
        }

        for row in &table.rows {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(ci, cell)| format!("{:<width$}", cell.text, width = col_widths[ci]))
                .collect();
            println!("| {} |", cells.join(" | "));
        }
        println!();
    }
}

fn write_json(tables: &[Table]) {
    let rendered: Vec<serde_json::Value> = tables
        .iter()
        .map(|table| {
            let rows: Vec<serde_json::Value> = table
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| {
                            let mut obj = serde_json::json!({ "text": cell.text });
                            if let Some(span) = cell.row_span {
                                obj["row_span"] = span.into();
                            }
                            if let Some(span) = cell.col_span {
                                obj["col_span"] = span.into();
                            }
                            obj
                        })
                        .collect()
                })
                .collect();

            serde_json::json!({
                "page": table.page_number,
                "confidence": table.confidence,
                "bbox": {
                    "x": table.bounding_box.x,
                    "y": table.bounding_box.y,
                    "width": table.bounding_box.width,
                    "height": table.bounding_box.height,
                },
                "rows": rows,
            })
        })
        .collect();

    println!("{}", serde_json::to_string(&rendered).unwrap());
}

fn write_csv(tables: &[Table]) {
    let mut first = true;
    for table in tables {
        if !first {
            println!();
        }
        first = false;

        for row in &table.rows {
            let cells: Vec<String> = row.iter().map(|c| csv_escape(&c.text)).collect();
            println!("{}", cells.join(","));
        }
    }
}
