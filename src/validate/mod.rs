//! Input rules for transaction and category writes.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::aggregate::{is_plain_decimal, to_cents};
use crate::error::{Error, Result};
use crate::models::TransactionType;

pub(crate) const MIN_DESCRIPTION_CHARS: usize = 3;
pub(crate) const MIN_CATEGORY_CHARS: usize = 2;
pub(crate) const MAX_CATEGORY_CHARS: usize = 50;

/// Largest value a `numeric(10,2)` amount column can hold.
pub(crate) fn max_amount() -> Decimal {
    Decimal::new(99_999_999_99, 2)
}

/// Raw transaction fields as they arrive from the user.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TransactionInput<'a> {
    pub(crate) amount: &'a str,
    pub(crate) description: &'a str,
    pub(crate) date: &'a str,
    pub(crate) kind: &'a str,
    pub(crate) category_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidTransaction {
    pub(crate) amount: Decimal,
    pub(crate) description: String,
    pub(crate) date: NaiveDate,
    pub(crate) transaction_type: TransactionType,
    pub(crate) category_id: Option<i64>,
}

/// Check every rule and report all failures at once.
pub(crate) fn validate_transaction(input: &TransactionInput<'_>) -> Result<ValidTransaction> {
    let mut problems = Vec::new();

    let amount = match parse_amount(input.amount) {
        Some(a) if a < Decimal::new(1, 2) => {
            problems.push("amount must be greater than zero".to_string());
            None
        }
        Some(a) if a > max_amount() => {
            problems.push(format!("amount must not exceed {}", max_amount()));
            None
        }
        Some(a) => Some(a),
        None => {
            problems.push(format!("amount \"{}\" is not a number", input.amount.trim()));
            None
        }
    };

    let description = input.description.trim();
    if description.chars().count() < MIN_DESCRIPTION_CHARS {
        problems.push(format!(
            "description must be at least {MIN_DESCRIPTION_CHARS} characters long"
        ));
    }

    let date = parse_date(input.date);
    if date.is_none() {
        problems.push(format!("date \"{}\" is not a valid date", input.date.trim()));
    }

    let transaction_type = TransactionType::parse_input(input.kind);
    if transaction_type.is_none() {
        let allowed: Vec<&str> = TransactionType::all().iter().map(|t| t.as_str()).collect();
        problems.push(format!(
            "type must be one of {} (got \"{}\")",
            allowed.join(", "),
            input.kind.trim()
        ));
    }

    match (amount, date, transaction_type) {
        (Some(amount), Some(date), Some(transaction_type)) if problems.is_empty() => {
            Ok(ValidTransaction {
                amount,
                description: description.to_string(),
                date,
                transaction_type,
                category_id: input.category_id,
            })
        }
        _ => Err(Error::Validation(problems)),
    }
}

/// Category names are trimmed and must be 2 to 50 characters long.
pub(crate) fn validate_category_name(name: &str) -> Result<String> {
    let name = name.trim();
    let len = name.chars().count();
    if len < MIN_CATEGORY_CHARS {
        return Err(Error::Validation(vec![format!(
            "category name must be at least {MIN_CATEGORY_CHARS} characters long"
        )]));
    }
    if len > MAX_CATEGORY_CHARS {
        return Err(Error::Validation(vec![format!(
            "category name cannot exceed {MAX_CATEGORY_CHARS} characters"
        )]));
    }
    Ok(name.to_string())
}

/// Parse a money amount, rounded to cents.
///
/// Accepts `1234.56`, `1234,56` and `1.234,56`, with an optional `R$`
/// prefix. Signs are kept so the caller can reject negatives.
pub(crate) fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    if !is_plain_decimal(&normalized) {
        return None;
    }
    Decimal::from_str(&normalized).ok().map(to_cents)
}

/// Parse `YYYY-MM-DD` or `DD/MM/YYYY`.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}
