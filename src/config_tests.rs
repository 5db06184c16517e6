#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::path::PathBuf;

use super::config::*;

fn config(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

#[test]
fn test_explicit_values() {
    let cfg = config(&[
        (DB_VAR, "/tmp/saldo-test.db"),
        (USER_VAR, "user_1"),
        (LOG_VAR, "saldo=debug"),
    ]);
    assert_eq!(cfg.db_path, PathBuf::from("/tmp/saldo-test.db"));
    assert_eq!(cfg.user_id.as_deref(), Some("user_1"));
    assert_eq!(cfg.log_filter, "saldo=debug");
    assert_eq!(cfg.require_user_id().unwrap(), "user_1");
}

#[test]
fn test_defaults() {
    let cfg = config(&[(DB_VAR, "saldo.db")]);
    assert!(cfg.user_id.is_none());
    assert_eq!(cfg.log_filter, "saldo=warn");
    let err = cfg.require_user_id().unwrap_err();
    assert!(err.to_string().contains(USER_VAR));
}

#[test]
fn test_blank_values_are_unset() {
    let cfg = config(&[(DB_VAR, "saldo.db"), (USER_VAR, "  "), (LOG_VAR, "")]);
    assert!(cfg.user_id.is_none());
    assert_eq!(cfg.log_filter, "saldo=warn");
}
