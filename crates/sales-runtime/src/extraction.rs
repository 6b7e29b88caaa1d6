//! Bounded parallel extraction.
//!
//! Each report is extracted on the tokio blocking pool. A semaphore caps how
//! many spreadsheets are open at once, and every file runs under its own
//! timeout so one stuck read only costs that file. All tasks are awaited
//! before the results are handed on.
//!
//! A read that times out keeps its slot until the blocking call returns, so
//! `jobs` bounds the open files even then. Once every slot is held by such a
//! read, files still waiting are failed instead of queued forever.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sales_core::error::{Result, SalesError};
use sales_core::models::{Diagnostic, SiteFileRecord, SiteSalesRecord, Stage};
use tokio::sync::Semaphore;
use tokio::time;

/// Extracted sales keyed by label, plus the per-file failures.
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    pub sales: HashMap<String, SiteSalesRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Concurrency limits for [`extract_all`].
#[derive(Debug, Clone, Copy)]
pub struct ExtractionLimits {
    /// Reports extracted at the same time. Values below 1 are treated as 1.
    pub jobs: usize,
    /// Time budget for a single report, counted from when it starts.
    pub per_file_timeout: Duration,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            jobs: 4,
            per_file_timeout: Duration::from_secs(120),
        }
    }
}

/// Run `extract` over every record and wait for all of them.
///
/// Diagnostics are returned in record order regardless of completion order.
pub async fn extract_all<F>(
    records: &[SiteFileRecord],
    limits: ExtractionLimits,
    extract: F,
) -> ExtractionOutcome
where
    F: Fn(&SiteFileRecord) -> Result<SiteSalesRecord> + Send + Sync + 'static,
{
    let slots = Arc::new(Slots::new(limits.jobs.max(1)));
    let extract = Arc::new(extract);

    let handles: Vec<_> = records
        .iter()
        .cloned()
        .map(|record| {
            let extract = Arc::clone(&extract);
            let slots = Arc::clone(&slots);
            let budget = limits.per_file_timeout;
            tokio::spawn(async move {
                let result = run_one(record.clone(), extract, slots, budget).await;
                (record, result)
            })
        })
        .collect();

    let mut outcome = ExtractionOutcome::default();
    for handle in handles {
        let (record, result) = match handle.await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!(error = %e, "extraction task failed to complete");
                continue;
            }
        };
        match result {
            Ok(sales) => {
                outcome.sales.insert(record.label.clone(), sales);
            }
            Err(e) => {
                tracing::warn!("{}: {}", record.label, e);
                outcome
                    .diagnostics
                    .push(Diagnostic::new(Stage::Extract, record.label.clone(), e));
            }
        }
    }

    tracing::debug!(
        extracted = outcome.sales.len(),
        failed = outcome.diagnostics.len(),
        "extraction finished"
    );
    outcome
}

// ── Slots ─────────────────────────────────────────────────────────────────────

const RUNNING: u8 = 0;
const DONE: u8 = 1;
const ABANDONED: u8 = 2;

/// Extraction slots plus a count of slots held by timed-out reads.
struct Slots {
    permits: Arc<Semaphore>,
    jobs: usize,
    stuck: AtomicUsize,
}

impl Slots {
    fn new(jobs: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(jobs)),
            jobs,
            stuck: AtomicUsize::new(0),
        }
    }

    /// Record that the read tracked by `state` timed out. Closes the
    /// semaphore when every slot is held by a timed-out read.
    fn abandon(&self, state: &AtomicU8) {
        self.stuck.fetch_add(1, Ordering::SeqCst);
        if state
            .compare_exchange(RUNNING, ABANDONED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            // The read finished in the meantime and its slot is free again.
            self.stuck.fetch_sub(1, Ordering::SeqCst);
            return;
        }
        let stuck = self.stuck.load(Ordering::SeqCst);
        if stuck >= self.jobs {
            tracing::error!(
                "all {} extraction slots are held by timed-out reads; failing the remaining files",
                self.jobs
            );
            self.permits.close();
        }
    }

    /// Called from the blocking read once it returns.
    fn finish(&self, state: &AtomicU8) {
        if state.swap(DONE, Ordering::SeqCst) == ABANDONED {
            self.stuck.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

async fn run_one<F>(
    record: SiteFileRecord,
    extract: Arc<F>,
    slots: Arc<Slots>,
    budget: Duration,
) -> Result<SiteSalesRecord>
where
    F: Fn(&SiteFileRecord) -> Result<SiteSalesRecord> + Send + Sync + 'static,
{
    let path = record.file_path.clone();
    let permit = Arc::clone(&slots.permits)
        .acquire_owned()
        .await
        .map_err(|_| SalesError::SpreadsheetRead {
            path: path.clone(),
            message: "not started: every extraction slot is held by a timed-out read"
                .to_string(),
        })?;

    let state = Arc::new(AtomicU8::new(RUNNING));
    let task = {
        let slots = Arc::clone(&slots);
        let state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || {
            let result = (*extract)(&record);
            slots.finish(&state);
            drop(permit);
            result
        })
    };

    match time::timeout(budget, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(SalesError::SpreadsheetRead {
            path,
            message: format!("extraction aborted: {}", join_err),
        }),
        Err(_) => {
            slots.abandon(&state);
            Err(SalesError::ExtractTimeout {
                path,
                secs: budget.as_secs(),
            })
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
