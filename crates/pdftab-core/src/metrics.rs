//! Per-call extraction metrics, returned as result metadata.
//!
//! No global metrics state exists in the core; callers that want to feed a
//! metrics sink read these values off the page result.

use std::time::Duration;

/// Counters and timing for one page-level extraction call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractMetrics {
    /// Wall-clock time spent in the extraction call.
    pub duration: Duration,
    /// Text fragments emitted by the interpreter.
    pub fragment_count: usize,
    /// Stroked segments emitted by the interpreter.
    pub segment_count: usize,
    /// Text elements after fragment merging.
    pub element_count: usize,
    /// Ruled lines after segment coalescing.
    pub ruled_line_count: usize,
    /// Tables that passed validation and were returned.
    pub tables_found: usize,
    /// Candidate tables dropped by scoring or validation.
    pub tables_dropped: usize,
}
