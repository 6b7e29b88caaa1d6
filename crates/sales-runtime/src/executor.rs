//! Runtime construction for the binary.
//!
//! A read abandoned after its timeout still occupies a blocking thread, and
//! dropping a tokio runtime waits for every blocking thread to finish. The
//! runtime built here is shut down with a bounded grace period instead, so a
//! hung spreadsheet read cannot keep the process alive.

use std::future::Future;
use std::time::Duration;

/// Grace period given to blocking reads still running at shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Run `future` to completion on a fresh multi-threaded runtime, then shut
/// the runtime down, waiting at most `grace` for leftover blocking work.
///
/// # Errors
/// Returns the I/O error when the runtime cannot be built.
pub fn block_on_with_grace<F: Future>(future: F, grace: Duration) -> std::io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let output = runtime.block_on(future);
    runtime.shutdown_timeout(grace);
    Ok(output)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{extract_all, ExtractionLimits};
    use sales_core::models::{SiteFileRecord, SiteSalesRecord};
    use std::path::PathBuf;
    use std::time::Instant;

    fn record(label: &str) -> SiteFileRecord {
        SiteFileRecord {
            account_id: "acc".to_string(),
            site_name: "美国".to_string(),
            label: label.to_string(),
            file_path: PathBuf::from(format!("/in/{}202401.xlsx", label)),
            skip_rows: 7,
            period: "202401".to_string(),
        }
    }

    #[test]
    fn test_block_on_returns_output() {
        let value = block_on_with_grace(async { 40 + 2 }, SHUTDOWN_GRACE).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_shutdown_does_not_wait_for_hung_read() {
        let limits = ExtractionLimits {
            jobs: 1,
            per_file_timeout: Duration::from_millis(50),
        };
        let records = vec![record("hung美国")];

        let started = Instant::now();
        let outcome = block_on_with_grace(
            async move {
                extract_all(&records, limits, |r: &SiteFileRecord| {
                    std::thread::sleep(Duration::from_secs(3));
                    Ok(SiteSalesRecord {
                        label: r.label.clone(),
                        gross_sales: 0.0,
                        fulfillment_cost: 0.0,
                        matched_rows: 0,
                    })
                })
                .await
            },
            Duration::from_millis(100),
        )
        .unwrap();

        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].message.contains("timed out"));
        assert!(
            started.elapsed() < Duration::from_millis(1500),
            "shutdown took {:?}",
            started.elapsed()
        );
    }
}
