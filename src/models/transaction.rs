use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TransactionType {
    Income,
    Expense,
    Saving,
}

impl TransactionType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Saving => "saving",
        }
    }

    /// Exact match on the stored form. Anything else, including other
    /// casings or padding, is `None`.
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "saving" => Some(Self::Saving),
            _ => None,
        }
    }

    /// Parse what a user typed: surrounding spaces and case are ignored.
    pub(crate) fn parse_input(s: &str) -> Option<Self> {
        Self::parse(&s.trim().to_lowercase())
    }

    pub(crate) fn all() -> &'static [TransactionType] {
        &[Self::Income, Self::Expense, Self::Saving]
    }

    /// Portuguese heading used by the listing pages.
    pub(crate) fn plural_label(&self) -> &'static str {
        match self {
            Self::Income => "Rendas",
            Self::Expense => "Despesas",
            Self::Saving => "Economias",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Transaction {
    pub(crate) id: i64,
    pub(crate) amount: Decimal,
    pub(crate) description: String,
    pub(crate) date: NaiveDate,
    pub(crate) transaction_type: TransactionType,
    pub(crate) category_id: Option<i64>,
    pub(crate) category_name: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl Transaction {
    pub(crate) fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub(crate) fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    pub(crate) fn is_saving(&self) -> bool {
        self.transaction_type == TransactionType::Saving
    }
}

/// A transaction exactly as it sits in the store: amount and type are the
/// raw column text, so integrity problems surface in the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LedgerRow {
    pub(crate) id: String,
    pub(crate) amount: String,
    pub(crate) kind: String,
    pub(crate) category_name: Option<String>,
    pub(crate) date: NaiveDate,
}

#[cfg(test)]
impl LedgerRow {
    pub(crate) fn new(
        id: impl Into<String>,
        amount: impl Into<String>,
        kind: impl Into<String>,
        category_name: Option<&str>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            amount: amount.into(),
            kind: kind.into(),
            category_name: category_name.map(str::to_string),
            date,
        }
    }
}
