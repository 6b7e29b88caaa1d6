//! Consolidation of per-site figures and currency conversion.

use std::collections::HashMap;

use sales_core::currency::CurrencyTable;
use sales_core::error::SalesError;
use sales_core::locale::LocaleProfile;
use sales_core::models::{
    ConsolidatedRow, Diagnostic, SiteFileRecord, SiteSalesRecord, Stage,
};
use tracing::warn;

// ── Totals ────────────────────────────────────────────────────────────────────

/// Column sums over a consolidated table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedTotals {
    /// Sum of present USD values.
    pub net_sales_usd: f64,
    /// Sum of present RMB values.
    pub net_sales_rmb: f64,
    pub rows: usize,
    /// Rows whose USD and RMB values are absent.
    pub missing_conversions: usize,
}

// ── SalesAggregator ───────────────────────────────────────────────────────────

/// Joins extracted sales with the located files and converts currencies.
pub struct SalesAggregator<'a> {
    rates: &'a CurrencyTable,
}

impl<'a> SalesAggregator<'a> {
    pub fn new(rates: &'a CurrencyTable) -> Self {
        Self { rates }
    }

    /// Build one row from a located file and its extracted sales.
    ///
    /// The second element is set when no USD rate is known for the site; the
    /// row is still produced with absent USD and RMB values.
    pub fn consolidate_one(
        &self,
        file: &SiteFileRecord,
        sales: &SiteSalesRecord,
    ) -> (ConsolidatedRow, Option<SalesError>) {
        let net_sales_origin = sales.gross_sales - sales.fulfillment_cost;
        let currency = LocaleProfile::find(&file.site_name).map(|p| p.currency);

        let net_sales_usd = currency.and_then(|code| self.rates.to_usd(net_sales_origin, code));
        let net_sales_rmb = net_sales_usd.map(|usd| self.rates.usd_to_rmb_amount(usd));

        let missing = net_sales_usd
            .is_none()
            .then(|| SalesError::MissingCurrencyMapping {
                site: file.site_name.clone(),
                currency: currency.unwrap_or("unknown").to_string(),
            });

        let row = ConsolidatedRow {
            label: file.label.clone(),
            site_name: file.site_name.clone(),
            currency: currency.map(str::to_string),
            gross_sales: sales.gross_sales,
            fulfillment_cost: sales.fulfillment_cost,
            net_sales_origin,
            net_sales_usd,
            net_sales_rmb,
        };
        (row, missing)
    }

    /// Consolidate every file that has extracted sales, in file order.
    ///
    /// Files without an entry in `sales` (extraction failed) are left out.
    /// Missing currency rates are returned as [`Stage::Convert`] diagnostics.
    pub fn consolidate(
        &self,
        files: &[SiteFileRecord],
        sales: &HashMap<String, SiteSalesRecord>,
    ) -> (Vec<ConsolidatedRow>, Vec<Diagnostic>) {
        let mut rows = Vec::with_capacity(sales.len());
        let mut diagnostics = Vec::new();

        for file in files {
            let Some(site_sales) = sales.get(&file.label) else {
                continue;
            };
            let (row, missing) = self.consolidate_one(file, site_sales);
            if let Some(e) = missing {
                warn!("{}: {}", file.label, e);
                diagnostics.push(Diagnostic::new(Stage::Convert, file.label.clone(), e));
            }
            rows.push(row);
        }

        (rows, diagnostics)
    }

    /// Sum the converted columns of `rows`, skipping absent values.
    pub fn calculate_totals(rows: &[ConsolidatedRow]) -> ConsolidatedTotals {
        let mut totals = ConsolidatedTotals {
            rows: rows.len(),
            ..ConsolidatedTotals::default()
        };
        for row in rows {
            match (row.net_sales_usd, row.net_sales_rmb) {
                (Some(usd), Some(rmb)) => {
                    totals.net_sales_usd += usd;
                    totals.net_sales_rmb += rmb;
                }
                _ => totals.missing_conversions += 1,
            }
        }
        totals
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
