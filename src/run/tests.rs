#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::path::PathBuf;

use super::*;
use crate::config::Config;
use crate::dashboard::LAST_MONTH_KEY;
use crate::db::{Database, TransactionFilter};
use crate::models::NewUser;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn setup() -> (Database, Config) {
    let mut db = Database::open_in_memory().unwrap();
    db.create_user(&NewUser::new("user_1".into(), "ana@example.com".into(), None))
        .unwrap();
    let config = Config {
        db_path: PathBuf::from(":memory:"),
        user_id: Some("user_1".into()),
        log_filter: "off".into(),
    };
    (db, config)
}

fn run(db: &mut Database, config: &Config, list: &[&str]) -> anyhow::Result<()> {
    let mut full = vec!["saldo"];
    full.extend_from_slice(list);
    as_cli(&args(&full), db, config, today())
}

// ── Argument helpers ──────────────────────────────────────────

#[test]
fn test_flag_value() {
    let a = args(&["expense", "10", "--date", "2024-01-05", "--category", "Lazer"]);
    assert_eq!(flag_value(&a, "--date"), Some("2024-01-05"));
    assert_eq!(flag_value(&a, "--category"), Some("Lazer"));
    assert_eq!(flag_value(&a, "--month"), None);
    // Flag as the last argument has no value.
    assert_eq!(flag_value(&args(&["--date"]), "--date"), None);
}

#[test]
fn test_positionals_skip_flags_and_values() {
    let a = args(&["expense", "--date", "2024-01-05", "10", "Pão", "de", "queijo"]);
    assert_eq!(positionals(&a), vec!["expense", "10", "Pão", "de", "queijo"]);
    assert!(positionals(&[]).is_empty());
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn test_add_edit_delete() {
    let (mut db, config) = setup();
    run(
        &mut db,
        &config,
        &["add", "expense", "1.234,50", "Aluguel", "de", "outubro", "--category", "moradia"],
    )
    .unwrap();

    let user = db.require_user("user_1").unwrap();
    let txns = db
        .get_transactions(&user, &TransactionFilter::default())
        .unwrap();
    assert_eq!(txns.len(), 1);
    let txn = &txns[0];
    assert_eq!(txn.amount, dec!(1234.50));
    assert_eq!(txn.description, "Aluguel de outubro");
    assert_eq!(txn.date, today());
    assert_eq!(txn.category_name.as_deref(), Some("Moradia"));

    let id = txn.id.to_string();
    run(&mut db, &config, &["edit", id.as_str(), "expense", "1300", "Aluguel"]).unwrap();
    let edited = db.get_transaction(&user, txn.id).unwrap();
    assert_eq!(edited.amount, dec!(1300));
    assert_eq!(edited.date, today());
    assert_eq!(edited.category_name.as_deref(), Some("Moradia"));

    run(&mut db, &config, &["delete", id.as_str()]).unwrap();
    assert_eq!(db.get_transaction_count(&user).unwrap(), 0);
    assert!(run(&mut db, &config, &["delete", id.as_str()]).is_err());
}

#[test]
fn test_add_rejects_invalid_input() {
    let (mut db, config) = setup();
    assert!(run(&mut db, &config, &["add", "expense", "0", "Nada"]).is_err());
    assert!(run(&mut db, &config, &["add", "gift", "10", "Presente"]).is_err());
    assert!(run(&mut db, &config, &["add", "expense", "10"]).is_err());
    assert!(run(
        &mut db,
        &config,
        &["add", "expense", "10", "Cinema", "--category", "Inexistente"]
    )
    .is_err());

    let user = db.require_user("user_1").unwrap();
    assert_eq!(db.get_transaction_count(&user).unwrap(), 0);
}

#[test]
fn test_add_with_explicit_date() {
    let (mut db, config) = setup();
    run(
        &mut db,
        &config,
        &["add", "income", "5000", "Salário", "--date", "05/09/2026"],
    )
    .unwrap();
    let user = db.require_user("user_1").unwrap();
    let txns = db
        .get_transactions(&user, &TransactionFilter::default())
        .unwrap();
    assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2026, 9, 5).unwrap());
}

#[test]
fn test_summary_persists_month() {
    let (mut db, config) = setup();
    run(&mut db, &config, &["summary", "2026-03"]).unwrap();
    let user = db.require_user("user_1").unwrap();
    assert_eq!(
        db.get_preference(&user, LAST_MONTH_KEY).unwrap().as_deref(),
        Some("2026-03")
    );
    assert!(run(&mut db, &config, &["summary", "March"]).is_err());
}

#[test]
fn test_list_and_show() {
    let (mut db, config) = setup();
    run(&mut db, &config, &["add", "saving", "100", "Reserva"]).unwrap();
    run(&mut db, &config, &["list"]).unwrap();
    run(&mut db, &config, &["list", "--type", "saving", "--month", "2026-10"]).unwrap();
    assert!(run(&mut db, &config, &["list", "--type", "transfer"]).is_err());
    run(&mut db, &config, &["list", "--limit", "1"]).unwrap();
    assert!(run(&mut db, &config, &["list", "--limit", "dez"]).is_err());
    assert!(run(&mut db, &config, &["list", "--limit", "-1"]).is_err());
    assert!(run(&mut db, &config, &["list", "--type", " Saving "]).is_ok());
    assert!(run(&mut db, &config, &["show", "999"]).is_err());
    assert!(run(&mut db, &config, &["show", "abc"]).is_err());
}

#[test]
fn test_category_commands() {
    let (mut db, config) = setup();
    run(&mut db, &config, &["category", "add", "Pets"]).unwrap();
    let user = db.require_user("user_1").unwrap();
    let pets = db
        .get_categories(&user)
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Pets")
        .unwrap();

    let id = pets.id.to_string();
    run(&mut db, &config, &["category", "rename", id.as_str(), "Animais", "de", "estimação"]).unwrap();
    assert_eq!(
        db.get_category(&user, pets.id).unwrap().name,
        "Animais de estimação"
    );

    assert!(run(&mut db, &config, &["category", "add", "Pets"]).is_ok());
    assert!(run(&mut db, &config, &["category", "add", "Pets"]).is_err());
    run(&mut db, &config, &["category", "delete", id.as_str()]).unwrap();
    assert!(run(&mut db, &config, &["category", "frobnicate"]).is_err());
}

#[test]
fn test_user_sync_from_file() {
    let (mut db, config) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(
        &path,
        r#"{"type": "user.created", "data": {"id": "user_2", "email_addresses": [{"email_address": "bia@example.com"}]}}"#,
    )
    .unwrap();

    run(&mut db, &config, &["user", "sync", path.to_str().unwrap()]).unwrap();
    assert!(db.get_user("user_2").unwrap().is_some());

    std::fs::write(&path, "{ not json").unwrap();
    assert!(run(&mut db, &config, &["user", "sync", path.to_str().unwrap()]).is_err());
    assert!(run(&mut db, &config, &["user", "sync"]).is_err());
}

#[test]
fn test_commands_need_a_synchronized_user() {
    let (mut db, mut config) = setup();
    config.user_id = Some("ghost".into());
    assert!(run(&mut db, &config, &["summary"]).is_err());

    config.user_id = None;
    assert!(run(&mut db, &config, &["categories"]).is_err());
    // Help needs no user.
    run(&mut db, &config, &["help"]).unwrap();
}

#[test]
fn test_unknown_command() {
    let (mut db, config) = setup();
    assert!(run(&mut db, &config, &["frobnicate"]).is_err());
}
