use chrono::{Datelike, Months, NaiveDate};

/// A calendar month. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct MonthSelector {
    year: i32,
    month: u32,
}

impl MonthSelector {
    pub(crate) fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub(crate) fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse `"YYYY-MM"` (a single-digit month is accepted).
    pub(crate) fn parse(s: &str) -> Option<Self> {
        let (year, month) = s.trim().split_once('-')?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    pub(crate) fn month(&self) -> u32 {
        self.month
    }

    pub(crate) fn first_day(&self) -> NaiveDate {
        // Constructors only admit months for which day 1 exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The last calendar day of the month. Range queries treat it as
    /// inclusive, so the whole day belongs to the month.
    pub(crate) fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Shift by a signed number of months.
    pub(crate) fn offset(&self, delta: i32) -> Option<Self> {
        let first = self.first_day();
        let shifted = if delta >= 0 {
            first.checked_add_months(Months::new(delta.unsigned_abs()))
        } else {
            first.checked_sub_months(Months::new(delta.unsigned_abs()))
        };
        shifted.map(Self::from_date)
    }
}

impl std::fmt::Display for MonthSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
