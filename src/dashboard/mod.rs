//! The monthly dashboard: which month to show and what it adds up to.

use chrono::NaiveDate;

use crate::aggregate::{aggregate, MonthlySummary};
use crate::db::Database;
use crate::error::Result;
use crate::models::{MonthSelector, User};

/// Preference key holding the month the user last looked at.
pub(crate) const LAST_MONTH_KEY: &str = "last_dashboard_month";

const MONTHS_BEFORE: i32 = 11;
const MONTHS_AFTER: i32 = 12;

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthOption {
    pub(crate) month: MonthSelector,
    /// `YYYY-MM`
    pub(crate) value: String,
    /// e.g. `Outubro 2026`
    pub(crate) label: String,
}

pub(crate) fn month_name(month: MonthSelector) -> &'static str {
    let index = month.month().saturating_sub(1) as usize;
    MONTH_NAMES.get(index).copied().unwrap_or("")
}

/// The selectable months: eleven before the current one through twelve
/// after it. The current month sits at index 11.
pub(crate) fn month_options(today: NaiveDate) -> Vec<MonthOption> {
    let current = MonthSelector::from_date(today);
    (-MONTHS_BEFORE..=MONTHS_AFTER)
        .filter_map(|delta| current.offset(delta))
        .map(|month| MonthOption {
            month,
            value: month.to_string(),
            label: format!("{} {}", month_name(month), month.year()),
        })
        .collect()
}

/// An explicit request wins. Otherwise the stored month is reused while it
/// is still one of the options, and the current month is the fallback.
pub(crate) fn resolve_month(
    requested: Option<MonthSelector>,
    stored: Option<&str>,
    today: NaiveDate,
) -> MonthSelector {
    if let Some(month) = requested {
        return month;
    }
    let options = month_options(today);
    stored
        .and_then(MonthSelector::parse)
        .filter(|m| options.iter().any(|o| o.month == *m))
        .unwrap_or_else(|| MonthSelector::from_date(today))
}

/// Resolve the month to show and remember it for next time.
pub(crate) fn select_month(
    db: &Database,
    user: &User,
    requested: Option<MonthSelector>,
    today: NaiveDate,
) -> Result<MonthSelector> {
    let stored = db.get_preference(user, LAST_MONTH_KEY)?;
    let month = resolve_month(requested, stored.as_deref(), today);
    db.set_preference(user, LAST_MONTH_KEY, &month.to_string())?;
    tracing::debug!(
        "dashboard month for {} is {month} (stored: {stored:?})",
        user.external_id
    );
    Ok(month)
}

pub(crate) fn load_summary(db: &Database, user: &User, month: MonthSelector) -> Result<MonthlySummary> {
    let rows = db.get_ledger_rows(user, month.first_day(), month.last_day())?;
    tracing::debug!("aggregating {} rows for {month}", rows.len());
    Ok(aggregate(&rows)?)
}

#[cfg(test)]
mod tests;
