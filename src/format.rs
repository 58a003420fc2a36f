//! Display formatting for amounts, dates and output filenames.
//!
//! The layout engine only ever receives pre-formatted strings; this is where
//! they are produced.

use chrono::{NaiveDate, NaiveDateTime};

/// Format an amount with thousands grouping and two decimals: `28,000.00`.
pub fn format_amount(value: f64) -> String {
    let rounded = (value.abs() * 100.0).round() / 100.0;
    let fixed = format!("{:.2}", rounded);
    let (digits, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && rounded > 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac)
}

/// Amount with an optional currency prefix.
pub fn format_money(value: f64, currency_symbol: &str) -> String {
    if currency_symbol.is_empty() {
        format_amount(value)
    } else {
        format!("{} {}", currency_symbol, format_amount(value))
    }
}

/// Quantities print without trailing zeros: `15`, `2.5`.
pub fn format_quantity(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        let s = format!("{:.3}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// `Feb 08, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Footer timestamp: `Generated on Oct 16, 2026 18:39`.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    format!("Generated on {}", at.format("%b %d, %Y %H:%M"))
}

/// Suggested output filename: `RFQ_RFQ20240092_20261016_183900.pdf`.
pub fn suggested_filename(prefix: &str, number: &str, at: NaiveDateTime) -> String {
    let number: String = number
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let stamp = at.format("%Y%m%d_%H%M%S");
    if number.is_empty() {
        format!("{}_{}.pdf", prefix, stamp)
    } else {
        format!("{}_{}_{}.pdf", prefix, number, stamp)
    }
}
