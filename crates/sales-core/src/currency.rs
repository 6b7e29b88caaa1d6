//! Currency conversion rates and the JSON file that overrides them.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SalesError};

// ── Default rates ─────────────────────────────────────────────────────────────

/// Built-in conversion rates to US dollars, keyed by currency code.
const DEFAULT_RATES_TO_USD: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("CAD", 0.75643),
    ("MXN", 0.04991),
    ("GBP", 1.2244953),
    ("JPY", 0.0094309),
    ("EUR", 1.1097927),
];

/// Built-in conversion rate from US dollars to renminbi.
pub const DEFAULT_USD_TO_RMB: f64 = 6.8747;

// ── RatesOverride ─────────────────────────────────────────────────────────────

/// Partial rate table read from a JSON file. Keys present here replace the
/// built-in values; everything else keeps its default.
///
/// ```json
/// { "rates_to_usd": { "EUR": 1.08 }, "usd_to_rmb": 7.1 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatesOverride {
    #[serde(default)]
    pub rates_to_usd: HashMap<String, f64>,
    #[serde(default)]
    pub usd_to_rmb: Option<f64>,
}

impl RatesOverride {
    /// Read and validate an override file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SalesError::RatesFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let parsed: RatesOverride =
            serde_json::from_str(&content).map_err(|e| SalesError::RatesFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let bad_rate = parsed
            .rates_to_usd
            .iter()
            .find(|(_, rate)| !rate.is_finite() || **rate <= 0.0)
            .map(|(code, rate)| format!("{}={}", code, rate))
            .or_else(|| {
                parsed
                    .usd_to_rmb
                    .filter(|r| !r.is_finite() || *r <= 0.0)
                    .map(|r| format!("usd_to_rmb={}", r))
            });
        if let Some(bad) = bad_rate {
            return Err(SalesError::RatesFile {
                path: path.to_path_buf(),
                message: format!("rates must be positive: {}", bad),
            });
        }

        tracing::debug!(
            "Loaded {} rate override(s) from {}",
            parsed.rates_to_usd.len() + usize::from(parsed.usd_to_rmb.is_some()),
            path.display()
        );
        Ok(parsed)
    }
}

// ── CurrencyTable ─────────────────────────────────────────────────────────────

/// Immutable conversion table shared read-only by the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyTable {
    rates_to_usd: HashMap<String, f64>,
    usd_to_rmb: f64,
}

impl Default for CurrencyTable {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CurrencyTable {
    /// Build the table from the built-in rates, applying `overrides` on top.
    pub fn new(overrides: Option<RatesOverride>) -> Self {
        let mut rates_to_usd: HashMap<String, f64> = DEFAULT_RATES_TO_USD
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect();
        let mut usd_to_rmb = DEFAULT_USD_TO_RMB;

        if let Some(o) = overrides {
            for (code, rate) in o.rates_to_usd {
                rates_to_usd.insert(code.to_uppercase(), rate);
            }
            if let Some(r) = o.usd_to_rmb {
                usd_to_rmb = r;
            }
        }

        Self {
            rates_to_usd,
            usd_to_rmb,
        }
    }

    /// Build a table containing exactly the given rates, with no defaults.
    pub fn with_rates(rates_to_usd: HashMap<String, f64>, usd_to_rmb: f64) -> Self {
        Self {
            rates_to_usd,
            usd_to_rmb,
        }
    }

    /// Rate from `currency` to USD, if known.
    pub fn rate_to_usd(&self, currency: &str) -> Option<f64> {
        self.rates_to_usd.get(currency).copied()
    }

    pub fn usd_to_rmb(&self) -> f64 {
        self.usd_to_rmb
    }

    /// Convert an amount in `currency` to USD. `None` when the currency has
    /// no rate.
    pub fn to_usd(&self, amount: f64, currency: &str) -> Option<f64> {
        self.rate_to_usd(currency).map(|rate| amount * rate)
    }

    pub fn usd_to_rmb_amount(&self, usd: f64) -> f64 {
        usd * self.usd_to_rmb
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
