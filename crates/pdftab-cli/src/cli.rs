use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Extract tables from PDF documents.
#[derive(Debug, Parser)]
#[command(name = "pdftab", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect and extract tables from PDF pages
    Tables {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Processing mode preset
        #[arg(long, value_enum, default_value_t = Mode::Balanced)]
        mode: Mode,

        /// Minimum table confidence to keep (overrides the mode preset)
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Minimum number of rows to form a table
        #[arg(long)]
        min_rows: Option<usize>,

        /// Minimum number of columns to form a table
        #[arg(long)]
        min_cols: Option<usize>,

        /// Disable row/column span detection
        #[arg(long)]
        no_merge_cells: bool,
    },

    /// Display page and table counts for a PDF
    Info {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,
    },
}

/// Processing mode preset.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Looser tolerances, no span detection
    Fast,
    /// The documented defaults
    Balanced,
    /// Tighter tolerances and a higher confidence bar
    Accurate,
}

/// Output format for the tables subcommand.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text grid
    Text,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}
