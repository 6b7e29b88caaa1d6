//! Report file-name classification.
//!
//! Exported reports are named `<account><site><period><suffix>`, for example
//! `SellerA德国202401.xlsx`, with no delimiter between the parts. The period
//! is the first run of digits, the site is the run of CJK characters directly
//! in front of it, and the account is whatever precedes the site. When that
//! run ends in a known site name only the known name is taken as the site, so
//! accounts written in CJK stay intact.

use std::sync::OnceLock;

use regex::Regex;
use sales_core::error::{Result, SalesError};
use sales_core::locale::{LocaleProfile, RegionClass, LOCALE_PROFILES};

/// Parts recovered from a report file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedName {
    pub account_id: String,
    pub site_name: String,
    pub period: String,
}

impl ClassifiedName {
    /// Account and site together, i.e. everything before the period.
    pub fn label(&self) -> String {
        format!("{}{}", self.account_id, self.site_name)
    }

    /// Region of the site, or `None` for a site without a profile.
    pub fn region(&self) -> Option<RegionClass> {
        LocaleProfile::find(&self.site_name).map(|p| p.region)
    }
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?s)(?P<prefix>.*?)(?P<period>\d+)").expect("regex is valid")
    })
}

fn site_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?P<site>[\x{4e00}-\x{9fa5}]+)$").expect("regex is valid"))
}

/// Split `file_name` into account, site and period.
///
/// # Errors
/// [`SalesError::Classification`] when the name has no digit run, no CJK
/// site directly before it, or nothing in front of the site.
pub fn classify(file_name: &str) -> Result<ClassifiedName> {
    let fail = |reason: &str| SalesError::Classification {
        file_name: file_name.to_string(),
        reason: reason.to_string(),
    };

    let caps = name_regex()
        .captures(file_name)
        .ok_or_else(|| fail("no numeric period"))?;
    let prefix = &caps["prefix"];
    let period = caps["period"].to_string();

    let site_caps = site_regex()
        .captures(prefix)
        .ok_or_else(|| fail("no site name before the period"))?;
    let run = site_caps
        .name("site")
        .ok_or_else(|| fail("no site name before the period"))?;

    let site_start = LOCALE_PROFILES
        .iter()
        .map(|p| p.site_name)
        .filter(|name| run.as_str().ends_with(name))
        .max_by_key(|name| name.len())
        .map(|name| prefix.len() - name.len())
        .unwrap_or(run.start());

    let account_id = &prefix[..site_start];
    if account_id.trim().is_empty() {
        return Err(fail("no account name before the site"));
    }

    Ok(ClassifiedName {
        account_id: account_id.to_string(),
        site_name: prefix[site_start..].to_string(),
        period,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_basic() {
        let c = classify("SellerA德国202401.xlsx").unwrap();
        assert_eq!(c.account_id, "SellerA");
        assert_eq!(c.site_name, "德国");
        assert_eq!(c.period, "202401");
        assert_eq!(c.label(), "SellerA德国");
    }

    #[test]
    fn test_classify_digits_in_account_fail() {
        // The first digit run is taken as the period, leaving no site before it.
        let err = classify("shop01意大利202407.csv").unwrap_err();
        assert!(err.to_string().contains("no site name"));
    }

    #[test]
    fn test_classify_region() {
        let na = classify("acc加拿大202401.xlsx").unwrap();
        assert_eq!(na.region(), Some(RegionClass::NorthAmerica));
        let intl = classify("acc西班牙202401.xlsx").unwrap();
        assert_eq!(intl.region(), Some(RegionClass::International));
        let unknown = classify("acc巴西202401.xlsx").unwrap();
        assert_eq!(unknown.region(), None);
    }

    #[test]
    fn test_classify_cjk_account() {
        let c = classify("星辰贸易A店加拿大202312报告.xlsx").unwrap();
        assert_eq!(c.account_id, "星辰贸易A店");
        assert_eq!(c.site_name, "加拿大");
        assert_eq!(c.period, "202312");
    }

    #[test]
    fn test_classify_unknown_site_keeps_whole_run() {
        let c = classify("acc巴西202401.xlsx").unwrap();
        assert_eq!(c.account_id, "acc");
        assert_eq!(c.site_name, "巴西");
    }

    #[test]
    fn test_classify_site_run_directly_before_digits() {
        let c = classify("AB美国2024-01.xlsx").unwrap();
        assert_eq!(c.account_id, "AB");
        assert_eq!(c.site_name, "美国");
        assert_eq!(c.period, "2024");
    }

    #[test]
    fn test_classify_no_digits_fails() {
        let err = classify("SellerA德国.xlsx").unwrap_err();
        assert!(err.to_string().contains("no numeric period"));
    }

    #[test]
    fn test_classify_no_site_fails() {
        let err = classify("SellerA202401.xlsx").unwrap_err();
        assert!(err.to_string().contains("no site name"));
    }

    #[test]
    fn test_classify_site_not_adjacent_fails() {
        let err = classify("SellerA德国_202401.xlsx").unwrap_err();
        assert!(matches!(err, SalesError::Classification { .. }));
    }

    #[test]
    fn test_classify_missing_account_fails() {
        let err = classify("日本202401.xlsx").unwrap_err();
        assert!(err.to_string().contains("no account name"));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let a = classify("acc法国202402.xls").unwrap();
        let b = classify("acc法国202402.xls").unwrap();
        assert_eq!(a, b);
    }
}
