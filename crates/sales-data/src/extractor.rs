//! Per-site sales extraction.
//!
//! Every site's report carries the same four columns of interest at the same
//! positions, whatever the header text says in the site's language:
//!
//! | position | content |
//! |---|---|
//! | 2 | transaction type |
//! | 8 | fulfillment channel |
//! | 12 | product sales |
//! | 13 | shipping credits |
//!
//! Only rows whose transaction type is the site's seller-type token count.

use sales_core::error::{Result, SalesError};
use sales_core::locale::LocaleProfile;
use sales_core::models::{SiteFileRecord, SiteSalesRecord};
use sales_core::numeric::normalize_amount;
use tracing::debug;

use crate::sheet::{load_grid, Cell};

// ── Column layout ─────────────────────────────────────────────────────────────

pub const COL_TRANSACTION_TYPE: usize = 2;
pub const COL_FULFILLMENT: usize = 8;
pub const COL_SALES: usize = 12;
pub const COL_SHIPPING_CREDIT: usize = 13;

/// Fulfillment-channel value of orders shipped by Amazon.
pub const AMAZON_CHANNEL: &str = "Amazon";

static EMPTY_CELL: Cell = Cell::Empty;

// ── SalesTotals ───────────────────────────────────────────────────────────────

/// Sums accumulated over the seller-order rows of one report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SalesTotals {
    pub product_sales: f64,
    pub shipping_credits: f64,
    /// Shipping credits on Amazon-fulfilled rows only.
    pub amazon_shipping_credits: f64,
    pub matched_rows: usize,
}

impl SalesTotals {
    /// Product sales plus all shipping credits.
    pub fn gross_sales(&self) -> f64 {
        self.product_sales + self.shipping_credits
    }

    pub fn fulfillment_cost(&self) -> f64 {
        self.amazon_shipping_credits
    }
}

/// Sum the seller-order rows of `rows`.
///
/// `rows` are data rows only (banner and header already removed). Cells
/// beyond the end of a short row are treated as empty.
pub fn summarize_rows(rows: &[Vec<Cell>], seller_token: &str) -> Result<SalesTotals> {
    let mut totals = SalesTotals::default();

    for row in rows {
        let cell = |idx: usize| row.get(idx).unwrap_or(&EMPTY_CELL);

        if cell(COL_TRANSACTION_TYPE).as_text() != seller_token {
            continue;
        }

        let sales = cell_amount(cell(COL_SALES), "sales")?;
        let credit = cell_amount(cell(COL_SHIPPING_CREDIT), "shipping_credit")?;

        totals.product_sales += sales;
        totals.shipping_credits += credit;
        if cell(COL_FULFILLMENT).as_text() == AMAZON_CHANNEL {
            totals.amazon_shipping_credits += credit;
        }
        totals.matched_rows += 1;
    }

    Ok(totals)
}

/// Read, filter and sum the report described by `record`.
///
/// # Errors
/// * [`SalesError::UnsupportedLocale`] for a site without a profile.
/// * [`SalesError::SpreadsheetRead`] when the file cannot be read or has no
///   header row after the banner.
/// * [`SalesError::NumericFormat`] when an amount cannot be parsed.
pub fn extract_site(record: &SiteFileRecord) -> Result<SiteSalesRecord> {
    let profile = LocaleProfile::lookup(&record.site_name)?;
    let grid = load_grid(&record.file_path)?;

    let header = grid
        .get(record.skip_rows)
        .ok_or_else(|| SalesError::SpreadsheetRead {
            path: record.file_path.clone(),
            message: format!("no header row after {} banner rows", record.skip_rows),
        })?;
    if header.len() <= COL_SHIPPING_CREDIT {
        return Err(SalesError::SpreadsheetRead {
            path: record.file_path.clone(),
            message: format!(
                "header row has {} columns, expected at least {}",
                header.len(),
                COL_SHIPPING_CREDIT + 1
            ),
        });
    }

    let totals = summarize_rows(&grid[record.skip_rows + 1..], profile.seller_token)?;

    debug!(
        "{} ({}): {} seller rows, gross {:.2}, fulfillment {:.2}",
        record.label,
        profile.english_name,
        totals.matched_rows,
        totals.gross_sales(),
        totals.fulfillment_cost()
    );

    Ok(SiteSalesRecord {
        label: record.label.clone(),
        gross_sales: totals.gross_sales(),
        fulfillment_cost: totals.fulfillment_cost(),
        matched_rows: totals.matched_rows,
    })
}

fn cell_amount(cell: &Cell, column: &'static str) -> Result<f64> {
    match cell {
        Cell::Empty => Ok(0.0),
        Cell::Number(n) => Ok(*n),
        Cell::Text(s) => normalize_amount(s, column),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
