//! Fragment merging and segment coalescing.
//!
//! Collapses adjacent text fragments on the same baseline into logical
//! [`TextElement`]s, and collinear overlapping stroke segments into logical
//! [`RuledLine`]s. The output preserves reading order: top-to-bottom by
//! baseline, left-to-right within a baseline. No further sorting happens
//! downstream until the table finder re-sorts.

use crate::content::{LineSegment, Orientation, RuledLine, TextElement, TextFragment};

/// Baseline tolerance for grouping fragments and merging decisions.
pub const BASELINE_TOLERANCE: f64 = 2.0;

/// Tolerance for classifying segments and clustering collinear lines.
pub const LINE_TOLERANCE: f64 = 2.0;

/// Maximum horizontal gap between merged fragments, as a fraction of the
/// left fragment's font size.
pub const ADJACENCY_FACTOR: f64 = 0.3;

/// Merge adjacent fragments on the same baseline into logical text elements.
///
/// Fragments are ordered top-to-bottom (descending y) with left-to-right
/// order within a baseline. Two consecutive fragments `a`, `b` merge when
/// all of the following hold:
///
/// 1. same baseline: `|a.y - b.y| < BASELINE_TOLERANCE`,
/// 2. horizontally adjacent: `0 <= b.x - a.right() < ADJACENCY_FACTOR * a.font_size`,
/// 3. same font resource name and font size.
///
/// Text is concatenated verbatim (whitespace is expected to be present in
/// the fragments themselves) and the merged width is `b.right() - a.x`.
pub fn merge_fragments(fragments: Vec<TextFragment>) -> Vec<TextElement> {
    if fragments.is_empty() {
        return Vec::new();
    }

    let mut sorted = fragments;
    sorted.sort_by(|a, b| {
        b.origin
            .y
            .partial_cmp(&a.origin.y)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Group consecutive fragments into baselines, then order each baseline
    // left-to-right before the adjacency pass.
    let mut elements = Vec::new();
    let mut start = 0;
    while start < sorted.len() {
        let baseline_y = sorted[start].origin.y;
        let mut end = start + 1;
        while end < sorted.len() && (sorted[end].origin.y - baseline_y).abs() < BASELINE_TOLERANCE {
            end += 1;
        }

        let mut group: Vec<TextFragment> = sorted[start..end].to_vec();
        group.sort_by(|a, b| {
            a.origin
                .x
                .partial_cmp(&b.origin.x)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        merge_baseline_group(group, &mut elements);
        start = end;
    }

    elements
}

/// Run the adjacency merge over one baseline's fragments (sorted by x).
fn merge_baseline_group(group: Vec<TextFragment>, out: &mut Vec<TextElement>) {
    let mut iter = group.into_iter();
    let Some(first) = iter.next() else {
        return;
    };
    let mut current = TextElement::from_fragment(first);

    for frag in iter {
        let gap = frag.origin.x - current.right();
        let same_baseline = (frag.origin.y - current.y).abs() < BASELINE_TOLERANCE;
        let adjacent = gap >= 0.0 && gap < ADJACENCY_FACTOR * current.font_size;
        let same_font =
            frag.font_name == current.font_name && frag.font_size == current.font_size;

        if same_baseline && adjacent && same_font {
            current.width = (frag.origin.x + frag.advance_width) - current.x;
            current.text.push_str(&frag.text);
        } else {
            out.push(std::mem::replace(
                &mut current,
                TextElement::from_fragment(frag),
            ));
        }
    }
    out.push(current);
}

/// Coalesce collinear, overlapping stroke segments into ruled lines.
///
/// Segments are partitioned into horizontal and vertical sets, grouped by
/// their fixed axis coordinate within [`LINE_TOLERANCE`], and merged into one
/// [`RuledLine`] per maximal interval along the orthogonal axis. Spans that
/// overlap or touch within the tolerance merge; the coalesced line takes the
/// group's mean axis coordinate and the widest stroke width.
pub fn coalesce_segments(segments: Vec<LineSegment>) -> Vec<RuledLine> {
    let mut horizontal: Vec<(f64, f64, f64, f64)> = Vec::new(); // (axis, lo, hi, width)
    let mut vertical: Vec<(f64, f64, f64, f64)> = Vec::new();

    for seg in &segments {
        match seg.orientation(LINE_TOLERANCE) {
            Some(Orientation::Horizontal) => {
                let axis = (seg.start.y + seg.end.y) / 2.0;
                let lo = seg.start.x.min(seg.end.x);
                let hi = seg.start.x.max(seg.end.x);
                horizontal.push((axis, lo, hi, seg.stroke_width));
            }
            Some(Orientation::Vertical) => {
                let axis = (seg.start.x + seg.end.x) / 2.0;
                let lo = seg.start.y.min(seg.end.y);
                let hi = seg.start.y.max(seg.end.y);
                vertical.push((axis, lo, hi, seg.stroke_width));
            }
            None => {}
        }
    }

    let mut lines = coalesce_axis_group(horizontal, Orientation::Horizontal);
    lines.extend(coalesce_axis_group(vertical, Orientation::Vertical));
    lines
}

/// Cluster spans by axis coordinate, then merge overlapping spans per cluster.
fn coalesce_axis_group(
    mut spans: Vec<(f64, f64, f64, f64)>,
    orientation: Orientation,
) -> Vec<RuledLine> {
    if spans.is_empty() {
        return Vec::new();
    }

    spans.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut lines = Vec::new();
    let mut start = 0;
    while start < spans.len() {
        let cluster_axis = spans[start].0;
        let mut end = start + 1;
        while end < spans.len() && (spans[end].0 - cluster_axis).abs() < LINE_TOLERANCE {
            end += 1;
        }

        let mean_axis: f64 =
            spans[start..end].iter().map(|s| s.0).sum::<f64>() / (end - start) as f64;

        let mut cluster: Vec<(f64, f64, f64)> = spans[start..end]
            .iter()
            .map(|&(_, lo, hi, w)| (lo, hi, w))
            .collect();
        cluster.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let (mut lo, mut hi, mut width) = cluster[0];
        for &(s_lo, s_hi, s_width) in &cluster[1..] {
            if s_lo <= hi + LINE_TOLERANCE {
                hi = hi.max(s_hi);
                width = width.max(s_width);
            } else {
                lines.push(RuledLine {
                    orientation,
                    axis: mean_axis,
                    lo,
                    hi,
                    stroke_width: width,
                });
                lo = s_lo;
                hi = s_hi;
                width = s_width;
            }
        }
        lines.push(RuledLine {
            orientation,
            axis: mean_axis,
            lo,
            hi,
            stroke_width: width,
        });

        start = end;
    }

    lines
}
