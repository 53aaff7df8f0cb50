//! Extraction options and processing mode presets.

/// Preset bundles for the tolerance and threshold options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcessingMode {
    /// Looser tolerances, lower confidence bar, no span detection.
    Fast,
    /// The documented defaults.
    #[default]
    Balanced,
    /// Tighter tolerances and a higher confidence bar.
    Accurate,
}

/// Options controlling table extraction behavior and resource limits.
///
/// All fields have documented defaults; customize with struct update syntax:
///
/// ```
/// use pdftab_core::ExtractOptions;
///
/// let options = ExtractOptions {
///     confidence_threshold: 0.9,
///     ..ExtractOptions::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Minimum table confidence to keep a detected table (default: 0.7).
    pub confidence_threshold: f64,
    /// Minimum number of qualifying rows to form a table (default: 3).
    pub min_rows: usize,
    /// Minimum number of elements per row to form a table (default: 2).
    pub min_cols: usize,
    /// Whether to detect row/column spans and merge cells (default: true).
    pub cell_merging: bool,
    /// Baseline bucketing tolerance in user-space units (default: 2.0).
    pub row_tolerance: f64,
    /// Column anchor rounding granularity in user-space units (default: 3.0).
    pub col_tolerance: f64,
    /// The preset this options value was built from (default: Balanced).
    pub processing_mode: ProcessingMode,
    /// Maximum number of tokens the lexer may produce per page
    /// (default: None = no limit). Exceeding it aborts the page with
    /// a limit error and zero tables.
    pub max_tokens: Option<usize>,
    /// Maximum nesting depth for arrays and dictionaries (default: 32).
    pub max_nesting_depth: usize,
    /// Whether to collect warnings during extraction (default: true).
    pub collect_warnings: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            min_rows: 3,
            min_cols: 2,
            cell_merging: true,
            row_tolerance: 2.0,
            col_tolerance: 3.0,
            processing_mode: ProcessingMode::Balanced,
            max_tokens: None,
            max_nesting_depth: 32,
            collect_warnings: true,
        }
    }
}

impl ExtractOptions {
    /// Build options from a processing mode preset.
    ///
    /// `Balanced` returns the defaults. `Fast` trades precision for recall
    /// and skips span detection; `Accurate` tightens every tolerance and
    /// raises the confidence bar.
    pub fn for_mode(mode: ProcessingMode) -> Self {
        match mode {
            ProcessingMode::Fast => Self {
                row_tolerance: 3.0,
                col_tolerance: 5.0,
                confidence_threshold: 0.6,
                cell_merging: false,
                processing_mode: ProcessingMode::Fast,
                ..Self::default()
            },
            ProcessingMode::Balanced => Self::default(),
            ProcessingMode::Accurate => Self {
                row_tolerance: 1.5,
                col_tolerance: 2.0,
                confidence_threshold: 0.8,
                cell_merging: true,
                processing_mode: ProcessingMode::Accurate,
                ..Self::default()
            },
        }
    }
}
