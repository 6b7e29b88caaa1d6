//! Per-site locale profiles.
//!
//! Every marketplace site is described by one row of [`LOCALE_PROFILES`]:
//! its region class (which decides how many banner rows precede the report
//! header), the seller-type token written in the transaction-type column, and
//! the currency the report is denominated in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SalesError};

// ── Region class ──────────────────────────────────────────────────────────────

/// Report layout family. Only used to pick the number of banner rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionClass {
    NorthAmerica,
    International,
}

impl RegionClass {
    /// Banner rows preceding the header row in a report of this region.
    pub fn skip_rows(self) -> usize {
        match self {
            RegionClass::NorthAmerica => 7,
            RegionClass::International => 6,
        }
    }
}

impl fmt::Display for RegionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionClass::NorthAmerica => write!(f, "North America"),
            RegionClass::International => write!(f, "International"),
        }
    }
}

// ── LocaleProfile ─────────────────────────────────────────────────────────────

/// Static description of one marketplace site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleProfile {
    /// Site name as it appears in report file names.
    pub site_name: &'static str,
    /// English site name, used in logs.
    pub english_name: &'static str,
    pub region: RegionClass,
    /// Value of the transaction-type column marking seller orders.
    pub seller_token: &'static str,
    /// ISO 4217 code of the report currency.
    pub currency: &'static str,
}

const fn profile(
    site_name: &'static str,
    english_name: &'static str,
    region: RegionClass,
    seller_token: &'static str,
    currency: &'static str,
) -> LocaleProfile {
    LocaleProfile {
        site_name,
        english_name,
        region,
        seller_token,
        currency,
    }
}

/// Every supported site.
pub const LOCALE_PROFILES: &[LocaleProfile] = &[
    profile("美国", "US", RegionClass::NorthAmerica, "Order", "USD"),
    profile("加拿大", "Canada", RegionClass::NorthAmerica, "Order", "CAD"),
    profile("墨西哥", "Mexico", RegionClass::International, "Pedido", "MXN"),
    profile("英国", "UK", RegionClass::International, "Order", "GBP"),
    profile("德国", "Germany", RegionClass::International, "Bestellung", "EUR"),
    profile("法国", "France", RegionClass::International, "Commande", "EUR"),
    profile("意大利", "Italy", RegionClass::International, "Ordine", "EUR"),
    profile("西班牙", "Spain", RegionClass::International, "Pedido", "EUR"),
    profile("日本", "Japan", RegionClass::International, "注文", "JPY"),
];

impl LocaleProfile {
    /// Exact lookup by site name, `None` when the site is unknown.
    pub fn find(site_name: &str) -> Option<&'static LocaleProfile> {
        LOCALE_PROFILES.iter().find(|p| p.site_name == site_name)
    }

    /// Exact lookup by site name.
    ///
    /// # Errors
    /// [`SalesError::UnsupportedLocale`] when no profile matches.
    pub fn lookup(site_name: &str) -> Result<&'static LocaleProfile> {
        Self::find(site_name).ok_or_else(|| SalesError::UnsupportedLocale(site_name.to_string()))
    }

    pub fn skip_rows(&self) -> usize {
        self.region.skip_rows()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
