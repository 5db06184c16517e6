mod category;
mod month;
mod transaction;
mod user;

pub(crate) use category::{Category, PREDEFINED_CATEGORIES};
pub(crate) use month::MonthSelector;
pub(crate) use transaction::{LedgerRow, Transaction, TransactionType};
pub(crate) use user::{NewUser, User};
