use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

// ── Output format ──────────────────────────────────────────────────────────────

/// File format of the consolidated table.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Excel workbook
    #[default]
    Xlsx,
    /// UTF-8 CSV with a byte-order mark
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Consolidate per-site marketplace sales reports into one net-sales table
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sales-statistics",
    about = "Consolidate per-site marketplace sales reports into one net-sales table",
    version
)]
pub struct Settings {
    /// Directory containing the monthly report exports
    pub input_dir: PathBuf,

    /// Directory the consolidated table is written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File format of the consolidated table
    #[arg(long, value_enum, default_value_t = OutputFormat::Xlsx)]
    pub format: OutputFormat,

    /// Number of reports extracted concurrently (1-64)
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u16).range(1..=64))]
    pub jobs: u16,

    /// Per-file extraction timeout in seconds (1-3600)
    #[arg(long, default_value = "120", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout_secs: u64,

    /// JSON file overriding the built-in currency rates
    #[arg(long)]
    pub rates: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Exit with a failure status when any file or row produced a warning
    #[arg(long)]
    pub strict: bool,
}

impl Settings {
    /// Log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
