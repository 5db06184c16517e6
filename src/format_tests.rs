#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::format::*;

// ── format_brl ────────────────────────────────────────────────

#[test]
fn test_format_brl_small() {
    assert_eq!(format_brl(dec!(5)), "R$ 5,00");
    assert_eq!(format_brl(dec!(0.5)), "R$ 0,50");
}

#[test]
fn test_format_brl_thousands() {
    assert_eq!(format_brl(dec!(1234.56)), "R$ 1.234,56");
    assert_eq!(format_brl(dec!(1234567.89)), "R$ 1.234.567,89");
    assert_eq!(format_brl(dec!(100000)), "R$ 100.000,00");
}

#[test]
fn test_format_brl_negative() {
    assert_eq!(format_brl(dec!(-1234.5)), "-R$ 1.234,50");
}

#[test]
fn test_format_brl_zero() {
    assert_eq!(format_brl(dec!(0)), "R$ 0,00");
    assert_eq!(format_brl(dec!(-0.00)), "R$ 0,00");
}

#[test]
fn test_format_brl_rounds_extra_digits() {
    assert_eq!(format_brl(dec!(10.999)), "R$ 11,00");
}

// ── dates / percentages ───────────────────────────────────────

#[test]
fn test_format_date() {
    let d = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
    assert_eq!(format_date(d), "07/03/2024");
}

#[test]
fn test_format_percent() {
    assert_eq!(format_percent(dec!(67)), "67%");
    assert_eq!(format_percent(dec!(100)), "100%");
    assert_eq!(format_percent(dec!(0)), "0%");
}

// ── truncate / column ─────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("Lazer", 10), "Lazer");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("Supermercado", 5), "Supe…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("Lazer", 0), "");
}

#[test]
fn test_truncate_accents() {
    assert_eq!(truncate("Educação básica", 9), "Educação…");
}

#[test]
fn test_column_pads_and_truncates() {
    assert_eq!(column("Saúde", 8), "Saúde   ");
    assert_eq!(column("Renda Extra", 6), "Renda…");
    assert_eq!(column("", 3), "   ");
}
