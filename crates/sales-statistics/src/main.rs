mod bootstrap;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use sales_core::currency::{CurrencyTable, RatesOverride};
use sales_core::settings::Settings;
use sales_report::{export, render_summary};
use sales_runtime::executor::{block_on_with_grace, SHUTDOWN_GRACE};
use sales_runtime::{ExtractionLimits, SalesPipeline};

fn main() -> Result<ExitCode> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level())?;

    block_on_with_grace(run(settings), SHUTDOWN_GRACE)
        .context("cannot start the async runtime")?
}

async fn run(settings: Settings) -> Result<ExitCode> {
    tracing::info!("Sales statistics v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, output: {} ({}), jobs: {}, timeout: {}s",
        settings.input_dir.display(),
        settings.output_dir.display(),
        settings.format,
        settings.jobs,
        settings.timeout_secs
    );

    let overrides = settings
        .rates
        .as_deref()
        .map(RatesOverride::load_from)
        .transpose()?;
    let rates = CurrencyTable::new(overrides);

    let limits = ExtractionLimits {
        jobs: usize::from(settings.jobs),
        per_file_timeout: Duration::from_secs(settings.timeout_secs),
    };

    let result = SalesPipeline::new(&settings.input_dir, rates, limits)
        .run()
        .await
        .with_context(|| format!("cannot process {}", settings.input_dir.display()))?;

    bootstrap::prepare_output_dir(&settings.output_dir)?;
    let path = export(
        &settings.output_dir,
        result.period.as_deref(),
        &result.rows,
        settings.format,
    )?;

    print!("{}", render_summary(&result, Some(&path)));

    if settings.strict && !result.diagnostics.is_empty() {
        tracing::error!(
            "{} warning(s) recorded; failing because --strict is set",
            result.diagnostics.len()
        );
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
