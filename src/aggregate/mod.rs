//! Monthly aggregation: turns one month of a user's ledger rows into the
//! dashboard totals and the per-category expense breakdown.
//!
//! The caller fetches the rows (already restricted to one user and to the
//! inclusive month bounds). Nothing here does I/O or keeps state between
//! calls.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::models::{LedgerRow, TransactionType};

/// Label shown for expenses without a category.
pub(crate) const UNCATEGORIZED_LABEL: &str = "Sem categoria";

/// Currency values carry exactly two fractional digits.
const CENTS_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum AggregationError {
    #[error("transaction {id} has an invalid amount \"{value}\"")]
    InvalidAmount { id: String, value: String },

    #[error("transaction {id} has an unknown type \"{value}\"")]
    InvalidTransactionType { id: String, value: String },

    #[error("remaining balance is out of range")]
    Overflow,
}

/// Grouping key for the expense breakdown.
///
/// Uncategorized is its own variant so a user category that happens to be
/// called "Sem categoria" never merges with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum CategoryLabel {
    Named(String),
    Uncategorized,
}

impl CategoryLabel {
    /// Missing, empty and whitespace-only names are uncategorized.
    pub(crate) fn resolve(name: Option<&str>) -> Self {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => Self::Named(n.to_string()),
            None => Self::Uncategorized,
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Uncategorized => UNCATEGORIZED_LABEL,
        }
    }
}

impl std::fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryTotal {
    pub(crate) label: CategoryLabel,
    pub(crate) total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthlySummary {
    pub(crate) total_income: Decimal,
    pub(crate) total_expenses: Decimal,
    pub(crate) total_savings: Decimal,
    /// Income minus expenses minus savings. May be negative.
    pub(crate) remaining_balance: Decimal,
    /// Sorted by total, largest first. Equal totals keep encounter order.
    pub(crate) expense_by_category: Vec<CategoryTotal>,
}

impl MonthlySummary {
    pub(crate) fn empty() -> Self {
        Self {
            total_income: zero(),
            total_expenses: zero(),
            total_savings: zero(),
            remaining_balance: zero(),
            expense_by_category: Vec::new(),
        }
    }

    /// Share of total expenses held by `entry`, as a whole percentage.
    pub(crate) fn share_percent(&self, entry: &CategoryTotal) -> Decimal {
        if self.total_expenses.is_zero() {
            return Decimal::ZERO;
        }
        (entry.total * Decimal::ONE_HUNDRED / self.total_expenses)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Aggregate one month of ledger rows.
///
/// Fails on the first row with an unparseable or negative amount, an amount
/// that would overflow a running total, or a type outside
/// income/expense/saving. No partial summary is returned.
pub(crate) fn aggregate(rows: &[LedgerRow]) -> Result<MonthlySummary, AggregationError> {
    let mut summary = MonthlySummary::empty();
    let mut categories: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<CategoryLabel, usize> = HashMap::new();

    for row in rows {
        let amount = parse_amount(row)?;
        let kind = TransactionType::parse(&row.kind).ok_or_else(|| {
            AggregationError::InvalidTransactionType {
                id: row.id.clone(),
                value: row.kind.clone(),
            }
        })?;

        let add = |total: &mut Decimal| -> Result<(), AggregationError> {
            *total = total
                .checked_add(amount)
                .ok_or_else(|| invalid_amount(row))?;
            Ok(())
        };

        match kind {
            TransactionType::Income => add(&mut summary.total_income)?,
            TransactionType::Saving => add(&mut summary.total_savings)?,
            TransactionType::Expense => {
                add(&mut summary.total_expenses)?;
                let label = CategoryLabel::resolve(row.category_name.as_deref());
                match index.get(&label) {
                    Some(&i) => add(&mut categories[i].total)?,
                    None => {
                        index.insert(label.clone(), categories.len());
                        categories.push(CategoryTotal {
                            label,
                            total: amount,
                        });
                    }
                }
            }
        }
    }

    summary.remaining_balance = summary
        .total_income
        .checked_sub(summary.total_expenses)
        .and_then(|b| b.checked_sub(summary.total_savings))
        .ok_or(AggregationError::Overflow)?;

    // `sort_by` is stable, which is what keeps ties in encounter order.
    categories.sort_by(|a, b| b.total.cmp(&a.total));
    summary.expense_by_category = categories;

    Ok(summary)
}

fn invalid_amount(row: &LedgerRow) -> AggregationError {
    AggregationError::InvalidAmount {
        id: row.id.clone(),
        value: row.amount.clone(),
    }
}

fn parse_amount(row: &LedgerRow) -> Result<Decimal, AggregationError> {
    if !is_plain_decimal(&row.amount) {
        return Err(invalid_amount(row));
    }
    let amount = Decimal::from_str(&row.amount).map_err(|_| invalid_amount(row))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(invalid_amount(row));
    }
    // abs() folds "-0" into 0.
    Ok(to_cents(amount.abs()))
}

/// `-?digits(.digits)?` and nothing else: no padding, `+`, `_`, or exponent.
pub(crate) fn is_plain_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    digits(int) && frac.map_or(true, digits)
}

/// Round half away from zero to two places and pin the scale at two, so
/// `300` and `300.00` both read back as `300.00`.
pub(crate) fn to_cents(amount: Decimal) -> Decimal {
    let mut cents =
        amount.round_dp_with_strategy(CENTS_SCALE, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(CENTS_SCALE);
    cents
}

fn zero() -> Decimal {
    Decimal::new(0, CENTS_SCALE)
}
