//! Currency amount parsing and formatting.
//!
//! Amounts arrive as numbers or as text such as `"RM 1,234.56"`. Absent or
//! unparsable input is 0; this never fails.

use trustlens_core::Scalar;

/// Parse a cell into an amount.
pub fn parse_amount(value: Option<&Scalar>) -> f64 {
    let amount = match value {
        None | Some(Scalar::Flag(_)) => 0.0,
        Some(Scalar::Number(n)) => *n,
        Some(Scalar::Text(s)) => parse_amount_str(s),
    };
    if amount.is_finite() { amount } else { 0.0 }
}

/// Parse currency text: currency markers, thousands separators, and
/// whitespace are dropped, then the longest numeric prefix is read.
pub fn parse_amount_str(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, 'R' | 'M' | ',') && !c.is_whitespace())
        .collect();
    let prefix = numeric_prefix(&cleaned);
    prefix.parse::<f64>().unwrap_or(0.0)
}

/// Longest prefix of `s` that reads as a decimal number, e.g. `"12.5kg"` → `"12.5"`.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            i = j;
        }
    }

    if digits == 0 {
        return "";
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    &s[..i]
}

/// Format an amount as Malaysian ringgit: `RM` + grouped value, two decimals.
pub fn format_currency(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}RM{grouped}.{cents}")
}
