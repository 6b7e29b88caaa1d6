use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One discovered report file, ready for extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFileRecord {
    /// Account name preceding the site in the file name.
    pub account_id: String,
    /// Site name, e.g. `"德国"`.
    pub site_name: String,
    /// Account and site together; the row key of the consolidated table.
    pub label: String,
    /// Absolute or root-relative path of the report.
    pub file_path: PathBuf,
    /// Banner rows preceding the header row.
    pub skip_rows: usize,
    /// Numeric period parsed from the file name, e.g. `"202401"`.
    pub period: String,
}

/// Sales figures extracted from one report, in the report's own currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSalesRecord {
    pub label: String,
    /// Product sales plus shipping credits over seller orders.
    pub gross_sales: f64,
    /// Shipping credits on orders fulfilled by Amazon.
    pub fulfillment_cost: f64,
    /// Seller-order rows that contributed to the totals.
    #[serde(default)]
    pub matched_rows: usize,
}

/// One row of the final table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRow {
    /// Row label (account + site).
    pub label: String,
    pub site_name: String,
    /// Origin currency code, `None` for an unknown site.
    pub currency: Option<String>,
    pub gross_sales: f64,
    pub fulfillment_cost: f64,
    pub net_sales_origin: f64,
    /// Absent when no USD rate is known for the site.
    pub net_sales_usd: Option<f64>,
    /// Absent whenever `net_sales_usd` is absent.
    pub net_sales_rmb: Option<f64>,
}

// ── Diagnostics ───────────────────────────────────────────────────────────────

/// Pipeline stage that produced a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Classify,
    Locate,
    Extract,
    Convert,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Classify => "classify",
            Stage::Locate => "locate",
            Stage::Extract => "extract",
            Stage::Convert => "convert",
        };
        f.write_str(s)
    }
}

/// A non-fatal problem recorded during a run and reported at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,
    /// File name or row label the problem concerns.
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: Stage, subject: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            stage,
            subject: subject.into(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.subject, self.message)
    }
}
