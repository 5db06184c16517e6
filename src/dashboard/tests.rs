#![allow(clippy::unwrap_used)]

use rusqlite::params;
use rust_decimal_macros::dec;

use super::*;
use crate::aggregate::{AggregationError, CategoryLabel};
use crate::error::Error;
use crate::models::{Category, NewUser};
use crate::validate::{validate_transaction, TransactionInput};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn month(y: i32, m: u32) -> MonthSelector {
    MonthSelector::new(y, m).unwrap()
}

fn setup() -> (Database, User) {
    let mut db = Database::open_in_memory().unwrap();
    let user = db
        .create_user(&NewUser::new(
            "user_1".into(),
            "ana@example.com".into(),
            None,
        ))
        .unwrap();
    (db, user)
}

fn add(db: &Database, user: &User, amount: &str, kind: &str, day: &str, category: Option<i64>) {
    let valid = validate_transaction(&TransactionInput {
        amount,
        description: "Lançamento",
        date: day,
        kind,
        category_id: category,
    })
    .unwrap();
    db.create_transaction(user, &valid).unwrap();
}

// ── Month options ─────────────────────────────────────────────

#[test]
fn test_month_options_window() {
    let options = month_options(date(2026, 10, 18));
    assert_eq!(options.len(), 24);
    assert_eq!(options[0].value, "2025-11");
    assert_eq!(options[0].label, "Novembro 2025");
    assert_eq!(options[11].value, "2026-10");
    assert_eq!(options[11].label, "Outubro 2026");
    assert_eq!(options[23].value, "2027-10");
}

#[test]
fn test_month_options_from_month_end() {
    // Day 31 must not skip or repeat short months.
    let options = month_options(date(2024, 1, 31));
    let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
    assert!(values.contains(&"2024-02"));
    let mut deduped = values.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), 24);
}

#[test]
fn test_month_names() {
    assert_eq!(month_name(month(2024, 1)), "Janeiro");
    assert_eq!(month_name(month(2024, 3)), "Março");
    assert_eq!(month_name(month(2024, 12)), "Dezembro");
}

// ── Month resolution ──────────────────────────────────────────

#[test]
fn test_resolve_month() {
    let today = date(2026, 10, 18);
    assert_eq!(resolve_month(None, None, today), month(2026, 10));
    assert_eq!(resolve_month(None, Some("2026-03"), today), month(2026, 3));
    // Outside the window, or garbage: back to the current month.
    assert_eq!(resolve_month(None, Some("2020-01"), today), month(2026, 10));
    assert_eq!(resolve_month(None, Some("junk"), today), month(2026, 10));
    // An explicit request may be any month.
    assert_eq!(
        resolve_month(Some(month(2019, 5)), Some("2026-03"), today),
        month(2019, 5)
    );
}

#[test]
fn test_select_month_remembers_choice() {
    let (db, user) = setup();
    let today = date(2026, 10, 18);

    assert_eq!(select_month(&db, &user, None, today).unwrap(), month(2026, 10));
    select_month(&db, &user, Some(month(2026, 2)), today).unwrap();
    assert_eq!(select_month(&db, &user, None, today).unwrap(), month(2026, 2));
    assert_eq!(
        db.get_preference(&user, LAST_MONTH_KEY).unwrap().as_deref(),
        Some("2026-02")
    );

    // A year later the stored month has left the window.
    assert_eq!(
        select_month(&db, &user, None, date(2027, 10, 1)).unwrap(),
        month(2027, 10)
    );
}

// ── Summary ───────────────────────────────────────────────────

#[test]
fn test_load_summary() {
    let (db, user) = setup();
    let cats = db.get_categories(&user).unwrap();
    let moradia = Category::find_by_name(&cats, "Moradia").unwrap().id;
    let lazer = Category::find_by_name(&cats, "Lazer").unwrap().id;

    add(&db, &user, "1000", "income", "2024-01-01", None);
    add(&db, &user, "300", "expense", "2024-01-10", Some(moradia));
    add(&db, &user, "150", "expense", "2024-01-15", Some(lazer));
    add(&db, &user, "100", "saving", "2024-01-31", None);
    add(&db, &user, "999", "expense", "2024-02-01", Some(lazer));

    let summary = load_summary(&db, &user, month(2024, 1)).unwrap();
    assert_eq!(summary.total_income, dec!(1000.00));
    assert_eq!(summary.total_expenses, dec!(450.00));
    assert_eq!(summary.total_savings, dec!(100.00));
    assert_eq!(summary.remaining_balance, dec!(450.00));
    assert_eq!(summary.expense_by_category.len(), 2);
    assert_eq!(
        summary.expense_by_category[0].label,
        CategoryLabel::Named("Moradia".into())
    );
    assert_eq!(summary.expense_by_category[1].total, dec!(150.00));
}

#[test]
fn test_load_summary_empty_month() {
    let (db, user) = setup();
    let summary = load_summary(&db, &user, month(2024, 1)).unwrap();
    assert_eq!(summary.total_income.to_string(), "0.00");
    assert!(summary.expense_by_category.is_empty());
}

#[test]
fn test_load_summary_deleted_category_is_uncategorized() {
    let (db, user) = setup();
    let pets = db.create_category(&user, "Pets").unwrap();
    add(&db, &user, "80", "expense", "2024-01-10", Some(pets.id));
    add(&db, &user, "20", "expense", "2024-01-11", None);
    db.delete_category(&user, pets.id).unwrap();

    let summary = load_summary(&db, &user, month(2024, 1)).unwrap();
    assert_eq!(summary.expense_by_category.len(), 1);
    assert_eq!(
        summary.expense_by_category[0].label,
        CategoryLabel::Uncategorized
    );
    assert_eq!(summary.expense_by_category[0].total, dec!(100.00));
}

#[test]
fn test_load_summary_surfaces_corrupt_rows() {
    let (db, user) = setup();
    add(&db, &user, "10", "income", "2024-01-10", None);
    db.connection()
        .execute(
            "UPDATE transactions SET type = ?1 WHERE user_id = ?2",
            params!["transfer", user.external_id],
        )
        .unwrap();

    let err = load_summary(&db, &user, month(2024, 1)).unwrap_err();
    assert!(matches!(
        err,
        Error::Aggregation(AggregationError::InvalidTransactionType { ref value, .. }) if value == "transfer"
    ));
}
