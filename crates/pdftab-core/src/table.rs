//! Table reconstruction from text elements and ruled lines.
//!
//! The [`TableFinder`] walks a page's merged text elements in six phases:
//! row bucketing, column frequency analysis, per-row scoring, run
//! accumulation, grid formation with span detection, and table scoring.
//! The output is a set of rectangular [`Table`]s with confidence scores.

use crate::content::{Orientation, RuledLine, TextElement};
use crate::geometry::Rect;
use crate::options::ExtractOptions;

/// Minimum number of elements sharing a column anchor for it to qualify.
pub const MIN_COL_FREQUENCY: usize = 3;

/// Window around a column anchor within which an element edge counts as aligned.
pub const ANCHOR_MATCH_TOLERANCE: f64 = 5.0;

/// Maximum vertical gap between consecutive rows of the same table.
pub const MAX_ROW_GAP: f64 = 20.0;

/// Row confidence a bucketed row must exceed to count as a table row.
pub const ROW_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// X tolerance when chaining cells of the same column for row spans.
const SPAN_X_TOLERANCE: f64 = 2.0;

/// Tolerance when testing whether a ruled line falls inside a table.
const LINE_BOUNDS_TOLERANCE: f64 = 2.0;

/// Gap-regularity bound for the ruled-line grid bonus: the variance of the
/// inter-line gaps must stay below this fraction of their mean.
const GRID_GAP_VARIANCE_FACTOR: f64 = 0.3;

/// A reconstructed table cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableCell {
    /// Cell text; empty string for cells with no projected elements.
    pub text: String,
    /// Cell bounds in page coordinates.
    pub bounds: Rect,
    /// Rows this cell spans; `None` is equivalent to 1.
    pub row_span: Option<usize>,
    /// Columns this cell spans; `None` is equivalent to 1.
    pub col_span: Option<usize>,
}

impl TableCell {
    /// Effective row span (1 when unset).
    pub fn effective_row_span(&self) -> usize {
        self.row_span.unwrap_or(1)
    }

    /// Effective column span (1 when unset).
    pub fn effective_col_span(&self) -> usize {
        self.col_span.unwrap_or(1)
    }

    /// Whether the cell text is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A reconstructed table.
///
/// Rows are ordered top-to-bottom (descending y) and cells within a row
/// left-to-right. The grid is rectangular *through spans*: the sum of
/// `col_span` values is the same for every row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    /// 1-based page number the table was found on.
    pub page_number: usize,
    /// Cell grid, top-to-bottom then left-to-right.
    pub rows: Vec<Vec<TableCell>>,
    /// Detection confidence in [0, 1].
    pub confidence: f64,
    /// Rectangle enclosing every cell.
    pub bounding_box: Rect,
}

impl Table {
    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Effective number of columns (sum of column spans of the first row).
    pub fn col_count(&self) -> usize {
        self.rows
            .first()
            .map(|row| row.iter().map(TableCell::effective_col_span).sum())
            .unwrap_or(0)
    }

    /// Positional header marker: the first row, if any.
    pub fn header(&self) -> Option<&[TableCell]> {
        self.rows.first().map(Vec::as_slice)
    }
}

/// Component scores for one bucketed row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowScore {
    /// Fraction of elements with an edge near a column anchor.
    pub alignment: f64,
    /// Regularity of the horizontal gaps between consecutive elements.
    pub spacing: f64,
    /// Element count relative to the number of candidate columns.
    pub density: f64,
}

impl RowScore {
    /// Composite row confidence: `0.5·alignment + 0.3·spacing + 0.2·density`.
    pub fn confidence(&self) -> f64 {
        0.5 * self.alignment + 0.3 * self.spacing + 0.2 * self.density
    }
}

/// Result of a table detection pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDetection {
    /// Tables that passed scoring and validation, top-to-bottom.
    pub tables: Vec<Table>,
    /// Number of candidate runs that materialized.
    pub candidates: usize,
    /// Candidates dropped by scoring or validation.
    pub dropped: usize,
}

/// One bucketed row: a baseline y and its elements sorted left-to-right.
#[derive(Debug, Clone)]
struct Row {
    y: f64,
    elements: Vec<TextElement>,
}

/// Mutable cell used while forming the grid.
#[derive(Debug, Clone)]
struct WorkingCell {
    text: String,
    bounds: Rect,
    col_index: usize,
    row_span: usize,
    col_span: usize,
}

impl WorkingCell {
    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Orchestrator for table reconstruction over a single page.
pub struct TableFinder {
    elements: Vec<TextElement>,
    lines: Vec<RuledLine>,
    options: ExtractOptions,
}

impl TableFinder {
    /// Create a finder over a page's merged elements and ruled lines.
    pub fn new(elements: Vec<TextElement>, lines: Vec<RuledLine>, options: ExtractOptions) -> Self {
        Self {
            elements,
            lines,
            options,
        }
    }

    /// Run the detection pipeline and return the surviving tables.
    pub fn find_tables(&self) -> TableDetection {
        let rows = self.bucket_rows();
        if rows.is_empty() {
            return TableDetection {
                tables: Vec::new(),
                candidates: 0,
                dropped: 0,
            };
        }

        let anchors = column_anchors(
            self.elements.iter(),
            self.options.col_tolerance,
            MIN_COL_FREQUENCY,
        );

        let scores: Vec<RowScore> = rows.iter().map(|row| score_row(row, &anchors)).collect();
        let runs = self.collect_runs(&rows, &scores);
        let candidates = runs.len();

        let mut tables = Vec::new();
        let mut dropped = 0;
        for run in &runs {
            match self.build_table(&rows, &scores, run) {
                Some(table) => tables.push(table),
                None => dropped += 1,
            }
        }

        TableDetection {
            tables,
            candidates,
            dropped,
        }
    }

    // --- Phase 1: row bucketing ---

    /// Round element baselines to multiples of `row_tolerance` and group.
    /// Rows come out top-to-bottom, elements left-to-right.
    fn bucket_rows(&self) -> Vec<Row> {
        use std::collections::BTreeMap;

        let tol = self.options.row_tolerance;
        let mut buckets: BTreeMap<i64, Vec<TextElement>> = BTreeMap::new();
        for element in &self.elements {
            let key = (element.y / tol).round() as i64;
            buckets.entry(key).or_default().push(element.clone());
        }

        buckets
            .into_iter()
            .rev()
            .map(|(key, mut elements)| {
                elements.sort_by(|a, b| {
                    a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
                });
                Row {
                    y: key as f64 * tol,
                    elements,
                }
            })
            .collect()
    }

    // --- Phase 4: run accumulation ---

    /// Walk rows top-to-bottom, accumulating runs of qualifying rows whose
    /// vertical gaps stay within [`MAX_ROW_GAP`]. A non-qualifying row or an
    /// out-of-range gap closes the current run. Runs shorter than `min_rows`,
    /// or containing a row with fewer than `min_cols` elements, are discarded.
    fn collect_runs(&self, rows: &[Row], scores: &[RowScore]) -> Vec<Vec<usize>> {
        let mut runs: Vec<Vec<usize>> = Vec::new();
        let mut current: Vec<usize> = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let qualifies = scores[i].confidence() > ROW_CONFIDENCE_THRESHOLD
                && row.elements.len() >= 2;

            if qualifies {
                if let Some(&last) = current.last() {
                    let gap = rows[last].y - row.y;
                    if gap <= MAX_ROW_GAP {
                        current.push(i);
                    } else {
                        runs.push(std::mem::take(&mut current));
                        current.push(i);
                    }
                } else {
                    current.push(i);
                }
            } else if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }

        runs.retain(|run| {
            run.len() >= self.options.min_rows
                && run
                    .iter()
                    .all(|&i| rows[i].elements.len() >= self.options.min_cols)
        });
        runs
    }

    // --- Phases 5 & 6: grid formation, span detection, scoring ---

    /// Materialize one run into a table, or `None` when validation drops it.
    fn build_table(&self, rows: &[Row], scores: &[RowScore], run: &[usize]) -> Option<Table> {
        let run_rows: Vec<&Row> = run.iter().map(|&i| &rows[i]).collect();

        // Column positions are re-derived from the run's own elements so
        // that unrelated content elsewhere on the page cannot distort the
        // grid of this region.
        let min_frequency = MIN_COL_FREQUENCY.min(run_rows.len());
        let anchors = column_anchors(
            run_rows.iter().flat_map(|row| row.elements.iter()),
            self.options.col_tolerance,
            min_frequency,
        );
        if anchors.len() < 2 {
            return None;
        }

        let mut grid = project_rows(&run_rows, &anchors);
        let anchors = drop_empty_columns(&mut grid, anchors);
        if anchors.len() < 2 {
            return None;
        }

        if self.options.cell_merging {
            detect_col_spans(&mut grid);
            detect_row_spans(&mut grid, &anchors);
        }

        // Base confidence is the mean of the member rows' composite scores;
        // the multiplicative adjustments below refine it.
        let base: f64 =
            run.iter().map(|&i| scores[i].confidence()).sum::<f64>() / run.len() as f64;
        let mut confidence = base;

        let widths: Vec<usize> = grid
            .iter()
            .map(|row| row.iter().map(|c| c.col_span).sum())
            .collect();
        let rectangular = widths.windows(2).all(|w| w[0] == w[1]);
        if !rectangular {
            confidence *= 0.8;
        }

        let total_cells: usize = grid.iter().map(Vec::len).sum();
        let blank_cells: usize = grid
            .iter()
            .flat_map(|row| row.iter())
            .filter(|c| c.is_blank())
            .count();
        let empty_ratio = blank_cells as f64 / total_cells as f64;
        confidence *= 1.0 - 0.5 * empty_ratio;

        confidence *= 0.8 + 0.2 * self.column_alignment_score(&grid);

        let bounding_box = grid
            .iter()
            .flat_map(|row| row.iter())
            .map(|c| c.bounds)
            .reduce(|a, b| a.union(&b))?;

        confidence *= self.ruled_line_factor(&bounding_box);
        confidence = confidence.clamp(0.0, 1.0);

        // Validation gates.
        if grid.len() < 2 {
            return None;
        }
        if widths.first().copied().unwrap_or(0) < 2 {
            return None;
        }
        if !rectangular {
            return None;
        }
        if 1.0 - empty_ratio < 0.3 {
            return None;
        }
        if confidence < self.options.confidence_threshold {
            return None;
        }

        let table_rows: Vec<Vec<TableCell>> = grid
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|c| TableCell {
                        text: c.text,
                        bounds: c.bounds,
                        row_span: (c.row_span > 1).then_some(c.row_span),
                        col_span: (c.col_span > 1).then_some(c.col_span),
                    })
                    .collect()
            })
            .collect();

        Some(Table {
            page_number: 1,
            rows: table_rows,
            confidence,
            bounding_box,
        })
    }

    /// Average per-column alignment: each column contributes the reciprocal
    /// of the number of distinct rounded x positions among its non-blank
    /// cells. Columns with no non-blank cells are skipped.
    fn column_alignment_score(&self, grid: &[Vec<WorkingCell>]) -> f64 {
        use std::collections::{BTreeMap, BTreeSet};

        let tol = self.options.col_tolerance;
        let mut distinct: BTreeMap<usize, BTreeSet<i64>> = BTreeMap::new();
        for row in grid {
            for cell in row {
                if !cell.is_blank() {
                    let key = (cell.bounds.x / tol).round() as i64;
                    distinct.entry(cell.col_index).or_default().insert(key);
                }
            }
        }

        if distinct.is_empty() {
            return 1.0;
        }
        let sum: f64 = distinct.values().map(|keys| 1.0 / keys.len() as f64).sum();
        sum / distinct.len() as f64
    }

    /// Ruled-line adjustment: ×1.1 when the lines inside the table bounds
    /// form a regular grid (at least two horizontal and two vertical lines
    /// with near-equal gaps), ×0.9 when lines are present without a grid
    /// pattern, ×1.0 when no lines fall inside the bounds.
    fn ruled_line_factor(&self, bounds: &Rect) -> f64 {
        let mut h_axes: Vec<f64> = Vec::new();
        let mut v_axes: Vec<f64> = Vec::new();

        for line in &self.lines {
            let inside = match line.orientation {
                Orientation::Horizontal => {
                    line.axis >= bounds.y - LINE_BOUNDS_TOLERANCE
                        && line.axis <= bounds.top() + LINE_BOUNDS_TOLERANCE
                        && line.lo >= bounds.x - LINE_BOUNDS_TOLERANCE
                        && line.hi <= bounds.right() + LINE_BOUNDS_TOLERANCE
                }
                Orientation::Vertical => {
                    line.axis >= bounds.x - LINE_BOUNDS_TOLERANCE
                        && line.axis <= bounds.right() + LINE_BOUNDS_TOLERANCE
                        && line.lo >= bounds.y - LINE_BOUNDS_TOLERANCE
                        && line.hi <= bounds.top() + LINE_BOUNDS_TOLERANCE
                }
            };
            if inside {
                match line.orientation {
                    Orientation::Horizontal => h_axes.push(line.axis),
                    Orientation::Vertical => v_axes.push(line.axis),
                }
            }
        }

        if h_axes.is_empty() && v_axes.is_empty() {
            return 1.0;
        }
        if h_axes.len() >= 2
            && v_axes.len() >= 2
            && gaps_are_regular(&mut h_axes)
            && gaps_are_regular(&mut v_axes)
        {
            1.1
        } else {
            0.9
        }
    }
}

/// Phase 2: count rounded left and right element edges; anchors seen at
/// least `min_frequency` times become candidate column positions.
fn column_anchors<'a>(
    elements: impl Iterator<Item = &'a TextElement>,
    col_tolerance: f64,
    min_frequency: usize,
) -> Vec<f64> {
    use std::collections::BTreeMap;

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for element in elements {
        let left = (element.x / col_tolerance).round() as i64;
        let right = (element.right() / col_tolerance).round() as i64;
        *counts.entry(left).or_insert(0) += 1;
        *counts.entry(right).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter(|&(_, count)| count >= min_frequency)
        .map(|(key, _)| key as f64 * col_tolerance)
        .collect()
}

/// Phase 3: score one bucketed row against the candidate column anchors.
fn score_row(row: &Row, anchors: &[f64]) -> RowScore {
    let n = row.elements.len();

    let alignment = if anchors.is_empty() || n == 0 {
        0.0
    } else {
        let aligned = row
            .elements
            .iter()
            .filter(|e| {
                anchors.iter().any(|&a| {
                    (e.x - a).abs() <= ANCHOR_MATCH_TOLERANCE
                        || (e.right() - a).abs() <= ANCHOR_MATCH_TOLERANCE
                })
            })
            .count();
        aligned as f64 / n as f64
    };

    let spacing = if n < 2 {
        0.0
    } else {
        let gaps: Vec<f64> = row
            .elements
            .windows(2)
            .map(|pair| pair[1].x - pair[0].right())
            .collect();
        let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
        if mean <= 0.0 {
            0.0
        } else {
            let variance =
                gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
            (1.0 - variance / (mean * mean)).max(0.0)
        }
    };

    let density = if anchors.is_empty() {
        0.0
    } else {
        (n as f64 / anchors.len() as f64).min(1.0)
    };

    RowScore {
        alignment,
        spacing,
        density,
    }
}

/// Phase 5a: project each row's elements onto the column anchors by their
/// centers: an element lands in the column whose half-open span
/// `[anchor_i, anchor_i+1)` contains its center. Unfilled positions become
/// blank cells sized to the column slot.
fn project_rows(run_rows: &[&Row], anchors: &[f64]) -> Vec<Vec<WorkingCell>> {
    let col_widths = column_widths(anchors);

    run_rows
        .iter()
        .map(|row| {
            let mut assigned: Vec<Vec<&TextElement>> = vec![Vec::new(); anchors.len()];
            for element in &row.elements {
                let col = column_for(element.center_x(), anchors);
                assigned[col].push(element);
            }

            let row_height = row
                .elements
                .iter()
                .map(|e| e.font_size)
                .fold(0.0_f64, f64::max);

            assigned
                .into_iter()
                .enumerate()
                .map(|(col_index, members)| {
                    if members.is_empty() {
                        WorkingCell {
                            text: String::new(),
                            bounds: Rect::new(
                                anchors[col_index],
                                row.y,
                                col_widths[col_index],
                                row_height,
                            ),
                            col_index,
                            row_span: 1,
                            col_span: 1,
                        }
                    } else {
                        let text = members
                            .iter()
                            .map(|e| e.text.as_str())
                            .collect::<Vec<_>>()
                            .join(" ");
                        let bounds = members
                            .iter()
                            .map(|e| e.bounds())
                            .reduce(|a, b| a.union(&b))
                            .expect("non-empty members");
                        WorkingCell {
                            text,
                            bounds,
                            col_index,
                            row_span: 1,
                            col_span: 1,
                        }
                    }
                })
                .collect()
        })
        .collect()
}

/// Column index whose span contains `center`: the rightmost anchor at or
/// left of it. Centers left of every anchor clamp to the first column.
fn column_for(center: f64, anchors: &[f64]) -> usize {
    match anchors.partition_point(|&a| a <= center) {
        0 => 0,
        n => n - 1,
    }
}

/// Slot width for each column: the distance to the next anchor, with the
/// last column taking the mean of the preceding gaps.
fn column_widths(anchors: &[f64]) -> Vec<f64> {
    let mut widths: Vec<f64> = anchors
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect();
    let mean = if widths.is_empty() {
        0.0
    } else {
        widths.iter().sum::<f64>() / widths.len() as f64
    };
    widths.push(mean);
    widths
}

/// Remove columns where every projected cell is blank (an artifact of a
/// left and a right anchor both qualifying for the same physical column),
/// then renumber the remaining columns.
fn drop_empty_columns(grid: &mut Vec<Vec<WorkingCell>>, anchors: Vec<f64>) -> Vec<f64> {
    let keep: Vec<bool> = (0..anchors.len())
        .map(|col| grid.iter().any(|row| !row[col].is_blank()))
        .collect();

    let kept_anchors: Vec<f64> = anchors
        .into_iter()
        .zip(&keep)
        .filter(|(_, &k)| k)
        .map(|(a, _)| a)
        .collect();

    for row in grid.iter_mut() {
        let mut next_index = 0;
        row.retain_mut(|cell| {
            if keep[cell.col_index] {
                cell.col_index = next_index;
                next_index += 1;
                true
            } else {
                false
            }
        });
    }

    kept_anchors
}

/// Phase 5b: horizontal span detection. Left-to-right within each row, a
/// non-blank cell absorbs a run of immediately following cells that are
/// either all blank or all carrying identical text. The absorbed cells are
/// removed and the survivor's `col_span` grows by the run length, so the
/// sum of spans per row is preserved.
fn detect_col_spans(grid: &mut [Vec<WorkingCell>]) {
    for row in grid.iter_mut() {
        let mut i = 0;
        while i < row.len() {
            if row[i].is_blank() {
                i += 1;
                continue;
            }

            // An absorption run is homogeneous: all blank, or all identical.
            let absorb_blanks = row.get(i + 1).map(|c| c.is_blank()).unwrap_or(false);
            let absorb_twins = row
                .get(i + 1)
                .map(|c| !c.is_blank() && c.text == row[i].text)
                .unwrap_or(false);

            if !absorb_blanks && !absorb_twins {
                i += 1;
                continue;
            }

            let mut end = i + 1;
            while end < row.len() {
                let next = &row[end];
                let matches = if absorb_blanks {
                    next.is_blank()
                } else {
                    !next.is_blank() && next.text == row[i].text
                };
                if matches {
                    end += 1;
                } else {
                    break;
                }
            }

            let absorbed: Vec<WorkingCell> = row.drain(i + 1..end).collect();
            let survivor = &mut row[i];
            survivor.col_span += absorbed.len();
            for cell in &absorbed {
                survivor.bounds = survivor.bounds.union(&cell.bounds);
            }
            i += 1;
        }
    }
}

/// Phase 5c: vertical span detection. Top-to-bottom within each column, a
/// non-blank cell followed by whitespace-only cells at the same x position
/// gains a matching `row_span`. The blank cells stay in place so the grid
/// remains rectangular through spans.
fn detect_row_spans(grid: &mut [Vec<WorkingCell>], anchors: &[f64]) {
    for (col, &anchor) in anchors.iter().enumerate() {
        let mut r = 0;
        while r < grid.len() {
            let Some(upper_idx) = cell_at(&grid[r], col, anchor) else {
                r += 1;
                continue;
            };
            if grid[r][upper_idx].is_blank() {
                r += 1;
                continue;
            }

            let mut span = 1;
            while r + span < grid.len() {
                let row = &grid[r + span];
                match cell_at(row, col, anchor) {
                    Some(idx) if row[idx].is_blank() => span += 1,
                    _ => break,
                }
            }

            if span > 1 {
                grid[r][upper_idx].row_span = span;
            }
            r += span;
        }
    }
}

/// Find the index of the cell occupying column `col` in `row`, requiring
/// its x position to align with the column anchor.
fn cell_at(row: &[WorkingCell], col: usize, anchor: f64) -> Option<usize> {
    row.iter().position(|cell| {
        cell.col_index == col
            && cell.col_span == 1
            && (cell.bounds.x - anchor).abs() <= SPAN_X_TOLERANCE
    })
}

/// Whether the gaps between consecutive sorted axis positions are nearly
/// equal (variance below [`GRID_GAP_VARIANCE_FACTOR`] of the mean).
fn gaps_are_regular(axes: &mut [f64]) -> bool {
    axes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let gaps: Vec<f64> = axes.windows(2).map(|pair| pair[1] - pair[0]).collect();
    if gaps.is_empty() {
        return false;
    }
    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    if mean <= 0.0 {
        return false;
    }
    let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
    variance < GRID_GAP_VARIANCE_FACTOR * mean
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(text: &str, x: f64, y: f64) -> TextElement {
        TextElement {
            text: text.to_string(),
            x,
            y,
            width: 0.6 * 12.0 * text.len() as f64,
            font_size: 12.0,
            font_name: "F1".to_string(),
        }
    }

    /// A clean 4×3 grid: header + three data rows at x = 50, 200, 280.
    fn employee_elements() -> Vec<TextElement> {
        vec![
            element("Name", 50.0, 700.0),
            element("Age", 200.0, 700.0),
            element("City", 280.0, 700.0),
            element("John Smith", 50.0, 680.0),
            element("35", 200.0, 680.0),
            element("New York", 280.0, 680.0),
            element("Jane Doe", 50.0, 660.0),
            element("28", 200.0, 660.0),
            element("Los Angeles", 280.0, 660.0),
            element("Bob Johnson", 50.0, 640.0),
            element("42", 200.0, 640.0),
            element("Chicago", 280.0, 640.0),
        ]
    }

    fn find(elements: Vec<TextElement>, lines: Vec<RuledLine>) -> TableDetection {
        TableFinder::new(elements, lines, ExtractOptions::default()).find_tables()
    }

    // --- Column anchors (phase 2) ---

    #[test]
    fn anchors_require_min_frequency() {
        let elements = employee_elements();
        let anchors = column_anchors(elements.iter(), 3.0, 3);
        // Left edges at 50, 200, 280 each appear 4 times and round to
        // multiples of the column tolerance.
        assert!(anchors.contains(&51.0));
        assert!(anchors.contains(&201.0));
        assert!(anchors.contains(&279.0));
        // The equal-width age cells contribute a shared right-edge anchor.
        assert!(anchors.contains(&213.0));
    }

    #[test]
    fn anchors_empty_for_sparse_elements() {
        let elements = vec![element("a", 50.0, 700.0), element("b", 90.0, 650.0)];
        let anchors = column_anchors(elements.iter(), 3.0, 3);
        assert!(anchors.is_empty());
    }

    // --- Row scoring (phase 3) ---

    #[test]
    fn aligned_row_scores_high() {
        let row = Row {
            y: 700.0,
            elements: vec![
                element("aaa", 50.0, 700.0),
                element("bbb", 200.0, 700.0),
                element("ccc", 350.0, 700.0),
            ],
        };
        let score = score_row(&row, &[50.0, 200.0, 350.0]);
        assert_eq!(score.alignment, 1.0);
        assert!(score.spacing > 0.9);
        assert_eq!(score.density, 1.0);
        assert!(score.confidence() > ROW_CONFIDENCE_THRESHOLD);
    }

    #[test]
    fn single_element_row_has_zero_spacing() {
        let row = Row {
            y: 700.0,
            elements: vec![element("only", 50.0, 700.0)],
        };
        let score = score_row(&row, &[50.0, 200.0]);
        assert_eq!(score.spacing, 0.0);
    }

    #[test]
    fn no_anchors_zeroes_alignment_and_density() {
        let row = Row {
            y: 700.0,
            elements: vec![element("a", 50.0, 700.0), element("b", 200.0, 700.0)],
        };
        let score = score_row(&row, &[]);
        assert_eq!(score.alignment, 0.0);
        assert_eq!(score.density, 0.0);
    }

    // --- End-to-end detection ---

    #[test]
    fn detects_clean_grid() {
        let detection = find(employee_elements(), Vec::new());
        assert_eq!(detection.tables.len(), 1);
        let table = &detection.tables[0];
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.col_count(), 3);
        assert!(table.confidence > 0.8);
        assert_eq!(table.rows[0][0].text, "Name");
        assert_eq!(table.rows[0][1].text, "Age");
        assert_eq!(table.rows[0][2].text, "City");
        assert_eq!(table.rows[3][2].text, "Chicago");
    }

    #[test]
    fn empty_page_yields_no_tables() {
        let detection = find(Vec::new(), Vec::new());
        assert!(detection.tables.is_empty());
        assert_eq!(detection.candidates, 0);
    }

    #[test]
    fn single_row_is_not_a_table() {
        let elements: Vec<TextElement> = (0..10)
            .map(|i| element("cell", 50.0 + 60.0 * i as f64, 700.0))
            .collect();
        let detection = find(elements, Vec::new());
        assert!(detection.tables.is_empty());
    }

    #[test]
    fn rows_farther_than_max_gap_do_not_chain() {
        // Three well-formed rows, but 50 units apart vertically: every run
        // is a single row and too short to materialize.
        let mut elements = Vec::new();
        for y in [700.0, 650.0, 600.0] {
            elements.push(element("aaa", 50.0, y));
            elements.push(element("bbb", 200.0, y));
            elements.push(element("ccc", 350.0, y));
        }
        let detection = find(elements, Vec::new());
        assert!(detection.tables.is_empty());
    }

    #[test]
    fn two_distant_grids_yield_two_tables() {
        let mut elements = Vec::new();
        for y in [700.0, 680.0, 660.0] {
            elements.push(element("alpha", 50.0, y));
            elements.push(element("beta", 200.0, y));
            elements.push(element("gamma", 350.0, y));
        }
        for y in [500.0, 480.0, 460.0] {
            elements.push(element("delta", 50.0, y));
            elements.push(element("epsilon", 200.0, y));
            elements.push(element("zeta", 350.0, y));
        }
        let detection = find(elements, Vec::new());
        assert_eq!(detection.tables.len(), 2);
        // Top-to-bottom output order.
        let first_y = detection.tables[0].rows[0][0].bounds.y;
        let second_y = detection.tables[1].rows[0][0].bounds.y;
        assert!(first_y > second_y);
    }

    #[test]
    fn tables_are_rectangular_through_spans() {
        let detection = find(employee_elements(), Vec::new());
        let table = &detection.tables[0];
        let widths: Vec<usize> = table
            .rows
            .iter()
            .map(|row| row.iter().map(TableCell::effective_col_span).sum())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn bounding_box_encloses_every_cell() {
        let detection = find(employee_elements(), Vec::new());
        let table = &detection.tables[0];
        for row in &table.rows {
            for cell in row {
                assert!(table.bounding_box.encloses(&cell.bounds, 1e-9));
            }
        }
    }

    #[test]
    fn cells_sorted_by_x_rows_by_descending_y() {
        let detection = find(employee_elements(), Vec::new());
        let table = &detection.tables[0];
        for row in &table.rows {
            for pair in row.windows(2) {
                assert!(pair[0].bounds.x < pair[1].bounds.x);
            }
        }
        for rows in table.rows.windows(2) {
            assert!(rows[0][0].bounds.y > rows[1][0].bounds.y);
        }
    }

    #[test]
    fn confidence_is_clamped() {
        let detection = find(employee_elements(), Vec::new());
        let c = detection.tables[0].confidence;
        assert!((0.0..=1.0).contains(&c));
    }

    // --- Span detection (phase 5) ---

    /// Four-row timeline grid whose second row holds a leading merge, an
    /// identical adjacent pair, and a trailing blank.
    fn timeline_elements() -> Vec<TextElement> {
        vec![
            element("Task", 50.0, 700.0),
            element("Q1", 150.0, 700.0),
            element("Q2", 250.0, 700.0),
            element("Q3", 350.0, 700.0),
            element("Q4", 450.0, 700.0),
            element("Development", 50.0, 680.0),
            element("Phase 2", 250.0, 680.0),
            element("Phase 2", 350.0, 680.0),
            element("Testing", 50.0, 660.0),
            element("Unit", 150.0, 660.0),
            element("Integration", 250.0, 660.0),
            element("System", 350.0, 660.0),
            element("UAT", 450.0, 660.0),
            element("Deploy", 50.0, 640.0),
            element("Stage", 150.0, 640.0),
            element("Prod", 250.0, 640.0),
            element("Done", 350.0, 640.0),
            element("Final", 450.0, 640.0),
        ]
    }

    #[test]
    fn horizontal_spans_absorb_blanks_and_twins() {
        let detection = find(timeline_elements(), Vec::new());
        assert_eq!(detection.tables.len(), 1);
        let table = &detection.tables[0];
        let row = &table.rows[1];

        // [Development(2), Phase 2(2), blank]: spans sum to 5.
        assert_eq!(row.len(), 3);
        assert_eq!(row[0].text, "Development");
        assert_eq!(row[0].col_span, Some(2));
        assert_eq!(row[1].text, "Phase 2");
        assert_eq!(row[1].col_span, Some(2));
        assert!(row[2].is_blank());
        let width: usize = row.iter().map(TableCell::effective_col_span).sum();
        assert_eq!(width, 5);
    }

    #[test]
    fn vertical_span_marks_cell_above_trailing_blank() {
        let detection = find(timeline_elements(), Vec::new());
        let table = &detection.tables[0];
        // "Q4" sits above the second row's trailing blank in the last column.
        let q4 = &table.rows[0][4];
        assert_eq!(q4.text, "Q4");
        assert_eq!(q4.row_span, Some(2));
    }

    #[test]
    fn cell_merging_disabled_keeps_all_cells() {
        let options = ExtractOptions {
            cell_merging: false,
            ..ExtractOptions::default()
        };
        let detection =
            TableFinder::new(timeline_elements(), Vec::new(), options).find_tables();
        assert_eq!(detection.tables.len(), 1);
        let row = &detection.tables[0].rows[1];
        assert_eq!(row.len(), 5);
        assert_eq!(row[1].text, "");
        assert_eq!(row[2].text, "Phase 2");
        assert_eq!(row[3].text, "Phase 2");
        assert!(row.iter().all(|c| c.col_span.is_none()));
    }

    // --- Confidence thresholds ---

    #[test]
    fn misaligned_variant_rejected_at_high_threshold() {
        let mut elements = employee_elements();
        // Shift one city cell sideways by 15 units.
        for e in &mut elements {
            if e.text == "Los Angeles" {
                e.x = 295.0;
            }
        }

        let strict = ExtractOptions {
            confidence_threshold: 0.95,
            ..ExtractOptions::default()
        };
        let detection = TableFinder::new(elements.clone(), Vec::new(), strict).find_tables();
        assert!(detection.tables.is_empty());
        assert_eq!(detection.dropped, 1);

        let lenient = ExtractOptions {
            confidence_threshold: 0.5,
            ..ExtractOptions::default()
        };
        let detection = TableFinder::new(elements, Vec::new(), lenient).find_tables();
        assert_eq!(detection.tables.len(), 1);
    }

    // --- Ruled-line adjustment (phase 6) ---

    fn hline(axis: f64, lo: f64, hi: f64) -> RuledLine {
        RuledLine {
            orientation: Orientation::Horizontal,
            axis,
            lo,
            hi,
            stroke_width: 0.5,
        }
    }

    fn vline(axis: f64, lo: f64, hi: f64) -> RuledLine {
        RuledLine {
            orientation: Orientation::Vertical,
            axis,
            lo,
            hi,
            stroke_width: 0.5,
        }
    }

    #[test]
    fn grid_lines_boost_confidence() {
        let without = find(employee_elements(), Vec::new());
        let base = without.tables[0].confidence;

        // Evenly spaced rules in both directions form a grid pattern.
        let lines = vec![
            hline(700.0, 50.0, 330.0),
            hline(680.0, 50.0, 330.0),
            hline(660.0, 50.0, 330.0),
            hline(640.0, 50.0, 330.0),
            vline(50.0, 640.0, 712.0),
            vline(190.0, 640.0, 712.0),
            vline(330.0, 640.0, 712.0),
        ];
        let with_grid = find(employee_elements(), lines);
        let boosted = with_grid.tables[0].confidence;
        assert!(boosted > base || (boosted - 1.0).abs() < 1e-9);
    }

    #[test]
    fn irregular_lines_penalize_confidence() {
        let without = find(employee_elements(), Vec::new());
        let base = without.tables[0].confidence;

        // A single stray horizontal rule inside the table bounds.
        let lines = vec![hline(670.0, 50.0, 330.0)];
        let with_stray = find(employee_elements(), lines);
        let penalized = with_stray.tables[0].confidence;
        assert!(penalized < base);
    }

    #[test]
    fn lines_outside_bounds_are_ignored() {
        let without = find(employee_elements(), Vec::new());
        let base = without.tables[0].confidence;

        let lines = vec![hline(100.0, 50.0, 330.0), vline(500.0, 100.0, 200.0)];
        let with_far = find(employee_elements(), lines);
        assert!((with_far.tables[0].confidence - base).abs() < 1e-9);
    }

    // --- Helpers ---

    #[test]
    fn gaps_regular_for_even_spacing() {
        let mut axes = vec![640.0, 660.0, 680.0, 700.0];
        assert!(gaps_are_regular(&mut axes));
    }

    #[test]
    fn gaps_irregular_for_uneven_spacing() {
        let mut axes = vec![0.0, 5.0, 100.0];
        assert!(!gaps_are_regular(&mut axes));
    }

    #[test]
    fn column_for_uses_half_open_spans() {
        let anchors = [100.0, 200.0, 300.0];
        assert_eq!(column_for(150.0, &anchors), 0);
        assert_eq!(column_for(200.0, &anchors), 1);
        assert_eq!(column_for(250.0, &anchors), 1);
        assert_eq!(column_for(400.0, &anchors), 2);
        // Centers left of the first anchor clamp to column zero.
        assert_eq!(column_for(50.0, &anchors), 0);
    }
}
