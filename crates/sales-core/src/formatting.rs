//! Number formatting for the terminal summary.

/// Placeholder shown for a missing converted amount.
pub const MISSING: &str = "-";

/// Format `value` with `decimals` fractional digits and comma thousands
/// grouping.
///
/// # Examples
///
/// ```
/// use sales_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 2), "1,234.50");
/// assert_eq!(format_number(-9876543.0, 0), "-9,876,543");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    // A value that rounds to zero never gets a sign.
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Format an optional amount, rendering `None` as [`MISSING`].
///
/// ```
/// use sales_core::formatting::format_optional;
///
/// assert_eq!(format_optional(Some(1500.0), 2), "1,500.00");
/// assert_eq!(format_optional(None, 2), "-");
/// ```
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format_number(v, decimals))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Format elapsed seconds as `"850ms"` below one second, `"2.4s"` above.
pub fn format_elapsed(secs: f64) -> String {
    if secs < 1.0 {
        format!("{}ms", (secs * 1000.0).round() as u64)
    } else {
        format!("{:.1}s", secs)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
