//! Main sales pipeline.
//!
//! Locates the reports, extracts every site in parallel, and consolidates the
//! results into converted rows, returning a [`PipelineResult`] ready for
//! export.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use sales_core::currency::CurrencyTable;
use sales_core::error::{Result, SalesError};
use sales_core::models::{ConsolidatedRow, Diagnostic, SiteFileRecord, SiteSalesRecord};
use sales_data::aggregator::{ConsolidatedTotals, SalesAggregator};
use sales_data::extractor::extract_site;
use sales_data::locator::locate_reports;

use crate::extraction::{extract_all, ExtractionLimits};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the consolidated rows.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RunMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    pub input_dir: PathBuf,
    /// Reports found and classified.
    pub files_located: usize,
    /// Reports whose figures were extracted.
    pub files_extracted: usize,
    pub locate_time_seconds: f64,
    pub extract_time_seconds: f64,
}

/// The complete output of [`SalesPipeline::run`].
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// One row per extracted report, in discovery order.
    pub rows: Vec<ConsolidatedRow>,
    pub totals: ConsolidatedTotals,
    /// Period label for the output file name.
    pub period: Option<String>,
    /// Every non-fatal problem, in pipeline order.
    pub diagnostics: Vec<Diagnostic>,
    pub metadata: RunMetadata,
}

/// Extraction function used for each located report.
pub type Extractor = fn(&SiteFileRecord) -> Result<SiteSalesRecord>;

// ── SalesPipeline ─────────────────────────────────────────────────────────────

/// Discover → extract → consolidate over one input directory.
pub struct SalesPipeline {
    input_dir: PathBuf,
    rates: CurrencyTable,
    limits: ExtractionLimits,
    extractor: Extractor,
}

impl SalesPipeline {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        rates: CurrencyTable,
        limits: ExtractionLimits,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            rates,
            limits,
            extractor: extract_site,
        }
    }

    /// Replace the per-report extraction step.
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn rates(&self) -> &CurrencyTable {
        &self.rates
    }

    /// Run the full pipeline.
    ///
    /// # Errors
    /// Only an unreadable input directory is fatal; every per-file problem is
    /// returned in [`PipelineResult::diagnostics`].
    pub async fn run(&self) -> Result<PipelineResult> {
        // ── Step 1: Locate ────────────────────────────────────────────────────
        let locate_start = Instant::now();
        let root = self.input_dir.clone();
        let located = tokio::task::spawn_blocking(move || locate_reports(&root))
            .await
            .map_err(|e| SalesError::Other(e.into()))??;
        let locate_time = locate_start.elapsed().as_secs_f64();
        tracing::info!(
            files = located.records.len(),
            period = located.period.as_deref().unwrap_or("unknown"),
            "reports located"
        );

        // ── Step 2: Extract ───────────────────────────────────────────────────
        let extract_start = Instant::now();
        let extraction = extract_all(&located.records, self.limits, self.extractor).await;
        let extract_time = extract_start.elapsed().as_secs_f64();
        tracing::info!(
            extracted = extraction.sales.len(),
            failed = extraction.diagnostics.len(),
            "reports extracted"
        );

        // ── Step 3: Consolidate ───────────────────────────────────────────────
        let aggregator = SalesAggregator::new(&self.rates);
        let (rows, convert_diagnostics) =
            aggregator.consolidate(&located.records, &extraction.sales);
        let totals = SalesAggregator::calculate_totals(&rows);

        let mut diagnostics = located.diagnostics;
        diagnostics.extend(extraction.diagnostics);
        diagnostics.extend(convert_diagnostics);

        let metadata = RunMetadata {
            generated_at: Utc::now().to_rfc3339(),
            input_dir: self.input_dir.clone(),
            files_located: located.records.len(),
            files_extracted: extraction.sales.len(),
            locate_time_seconds: locate_time,
            extract_time_seconds: extract_time,
        };

        Ok(PipelineResult {
            rows,
            totals,
            period: located.period,
            diagnostics,
            metadata,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
