//! Locale-tolerant parsing of amounts exported as text.
//!
//! Reports from different sites write `1,234.56`, `1.234,56`, `1 234,56` or
//! plain `1234.56`. The rightmost separator is taken as the decimal point and
//! every other separator is dropped, so no per-locale branching is needed.
//! A lone comma is always decimal, so `12,000` reads as twelve.

use crate::error::{Result, SalesError};

/// Parse a locale-formatted amount.
///
/// Blank input counts as zero, the same way an empty cell does.
///
/// ```
/// use sales_core::numeric::normalize_amount;
///
/// assert_eq!(normalize_amount("1.234,56", "sales").unwrap(), 1234.56);
/// assert_eq!(normalize_amount("1,234.56", "sales").unwrap(), 1234.56);
/// assert_eq!(normalize_amount("1234.56", "sales").unwrap(), 1234.56);
/// ```
///
/// # Errors
/// [`SalesError::NumericFormat`] when the remaining text is not a number.
pub fn normalize_amount(raw: &str, column: &'static str) -> Result<f64> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();
    if compact.is_empty() {
        return Ok(0.0);
    }

    let canonical = canonicalize_separators(&compact);
    canonical
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SalesError::NumericFormat {
            value: raw.to_string(),
            column,
        })
}

/// Rewrite `s` so that `.` is the only separator left and it marks the
/// decimal point.
fn canonicalize_separators(s: &str) -> String {
    let commas = s.matches(',').count();
    let dots = s.matches('.').count();

    match (s.rfind(','), s.rfind('.')) {
        // `1.234,56`: periods group thousands, the last comma is decimal.
        (Some(c), Some(d)) if c > d => promote_last_comma(&s.replace('.', "")),
        // `1,234.56`: commas group thousands.
        (Some(_), Some(_)) => s.replace(',', ""),
        // `1,234,567`: a repeated lone separator can only group thousands.
        (Some(_), None) if commas > 1 => s.replace(',', ""),
        // `1234,56`, `12,000`
        (Some(_), None) => promote_last_comma(s),
        (None, Some(_)) if dots > 1 => s.replace('.', ""),
        _ => s.to_string(),
    }
}

/// Turn the rightmost comma into a decimal point and drop the others.
fn promote_last_comma(s: &str) -> String {
    let reversed: String = s.chars().rev().collect();
    let promoted = reversed.replacen(',', ".", 1);
    let restored: String = promoted.chars().rev().collect();
    restored.replace(',', "")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
