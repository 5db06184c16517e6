use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::aggregate::to_cents;

/// Format an amount as Brazilian reais with `.` thousand separators and a
/// `,` decimal separator, rounded half away from zero to cents.
/// e.g. `1234567.89` → `"R$ 1.234.567,89"`
pub(crate) fn format_brl(val: Decimal) -> String {
    let val = to_cents(val);
    let abs = val.abs();
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_dots: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(".");

    if val < Decimal::ZERO {
        format!("-R$ {with_dots},{dec_part}")
    } else {
        format!("R$ {with_dots},{dec_part}")
    }
}

/// `DD/MM/YYYY`
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Whole percentage, e.g. `67%`.
pub(crate) fn format_percent(val: Decimal) -> String {
    format!("{}%", val.normalize())
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// The result is guaranteed to be at most `max` characters (counting "…" as one).
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// Left-align `s` in a column of `width` characters, truncating if needed.
/// `format!("{:<w$}")` pads by chars too, but does not truncate.
pub(crate) fn column(s: &str, width: usize) -> String {
    let s = truncate(s, width);
    let pad = width.saturating_sub(s.chars().count());
    format!("{s}{}", " ".repeat(pad))
}
