mod schema;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::*;
use crate::validate::{validate_category_name, ValidTransaction};

const DATE_FORMAT: &str = "%Y-%m-%d";

const TRANSACTION_SELECT: &str =
    "SELECT t.id, CAST(t.amount AS TEXT), t.description, t.date, t.type,
            t.category_id, c.name, t.created_at, t.updated_at
     FROM transactions t LEFT JOIN categories c ON t.category_id = c.id";

const USER_SELECT: &str =
    "SELECT external_id, email, name, created_at, updated_at FROM users";

const CATEGORY_SELECT: &str = "SELECT id, name, is_custom FROM categories";

/// Filters for listing a user's transactions. Both date bounds are
/// inclusive calendar days.
#[derive(Debug, Clone, Default)]
pub(crate) struct TransactionFilter {
    pub(crate) transaction_type: Option<TransactionType>,
    pub(crate) start: Option<NaiveDate>,
    pub(crate) end: Option<NaiveDate>,
    pub(crate) limit: Option<u32>,
}

impl TransactionFilter {
    pub(crate) fn for_month(month: MonthSelector) -> Self {
        Self {
            start: Some(month.first_day()),
            end: Some(month.last_day()),
            ..Self::default()
        }
    }

    pub(crate) fn with_type(mut self, transaction_type: Option<TransactionType>) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub(crate) fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }
}

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        tracing::debug!("opened database at {}", path.display());
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the schema in a fresh file, accept the current version, and
    /// refuse files from a newer build.
    fn migrate(&mut self) -> Result<()> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        match version {
            0 => {
                let tx = self.conn.transaction()?;
                tx.execute_batch(schema::SCHEMA_V1)?;
                tx.pragma_update(None, "user_version", schema::CURRENT_VERSION)?;
                tx.commit()?;
                tracing::info!("created database schema v{}", schema::CURRENT_VERSION);
                Ok(())
            }
            v if v == schema::CURRENT_VERSION => Ok(()),
            v => Err(Error::UnsupportedSchema(v)),
        }
    }

    // ── Users ─────────────────────────────────────────────────

    /// Insert a user and give them the predefined categories, atomically.
    pub(crate) fn create_user(&mut self, user: &NewUser) -> Result<User> {
        let now = now();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO users (external_id, email, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![user.external_id, user.email, user.name, now],
        )?;
        seed_categories(&tx, &user.external_id, &now)?;
        tx.commit()?;
        tracing::info!("user {} created", user.external_id);
        self.require_user(&user.external_id)
    }

    /// Overwrite email and name. `None` keeps the stored value.
    pub(crate) fn update_user(
        &self,
        external_id: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<User> {
        let changed = self.conn.execute(
            "UPDATE users SET email = COALESCE(?2, email), name = COALESCE(?3, name),
                              updated_at = ?4
             WHERE external_id = ?1",
            params![external_id, email, name, now()],
        )?;
        if changed == 0 {
            return Err(Error::NotFound);
        }
        tracing::info!("user {external_id} updated");
        self.require_user(external_id)
    }

    pub(crate) fn get_user(&self, external_id: &str) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(
                &format!("{USER_SELECT} WHERE external_id = ?1"),
                params![external_id],
                read_user,
            )
            .optional()?)
    }

    /// Like [`Database::get_user`], for operations that need the user to
    /// exist.
    pub(crate) fn require_user(&self, external_id: &str) -> Result<User> {
        self.get_user(external_id)?
            .ok_or_else(|| Error::UserNotSynchronized(external_id.to_string()))
    }

    /// Delete a user and, through the foreign keys, everything they own.
    pub(crate) fn delete_user(&self, external_id: &str) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM users WHERE external_id = ?1",
            params![external_id],
        )?;
        if deleted > 0 {
            tracing::info!("user {external_id} deleted");
        }
        Ok(deleted > 0)
    }

    /// Add any missing predefined categories. Safe to call repeatedly.
    pub(crate) fn seed_predefined_categories(&mut self, external_id: &str) -> Result<()> {
        self.require_user(external_id)?;
        let tx = self.conn.transaction()?;
        seed_categories(&tx, external_id, &now())?;
        tx.commit()?;
        Ok(())
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn create_category(&self, user: &User, name: &str) -> Result<Category> {
        let name = validate_category_name(name)?;
        if self.find_category_by_name(user, &name)?.is_some() {
            return Err(Error::DuplicateCategory(name));
        }
        let now = now();
        self.conn.execute(
            "INSERT INTO categories (user_id, name, is_custom, created_at, updated_at)
             VALUES (?1, ?2, 1, ?3, ?3)",
            params![user.external_id, name, now],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!("category {id} \"{name}\" created for {}", user.external_id);
        self.get_category(user, id)
    }

    pub(crate) fn get_categories(&self, user: &User) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT} WHERE user_id = ?1 ORDER BY name"
        ))?;
        let rows = stmt.query_map(params![user.external_id], read_category)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category(&self, user: &User, id: i64) -> Result<Category> {
        Ok(self.conn.query_row(
            &format!("{CATEGORY_SELECT} WHERE id = ?1 AND user_id = ?2"),
            params![id, user.external_id],
            read_category,
        )?)
    }

    fn find_category_by_name(&self, user: &User, name: &str) -> Result<Option<Category>> {
        Ok(self
            .conn
            .query_row(
                &format!("{CATEGORY_SELECT} WHERE user_id = ?1 AND name = ?2"),
                params![user.external_id, name],
                read_category,
            )
            .optional()?)
    }

    /// The category must exist, belong to `user` and be custom; anything
    /// else is reported as not found.
    fn get_custom_category(&self, user: &User, id: i64) -> Result<Category> {
        let category = self.get_category(user, id)?;
        if !category.is_custom {
            return Err(Error::NotFound);
        }
        Ok(category)
    }

    pub(crate) fn rename_category(&self, user: &User, id: i64, name: &str) -> Result<Category> {
        let name = validate_category_name(name)?;
        self.get_custom_category(user, id)?;
        if let Some(other) = self.find_category_by_name(user, &name)? {
            if other.id != id {
                return Err(Error::DuplicateCategory(name));
            }
        }
        self.conn.execute(
            "UPDATE categories SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![name, now(), id],
        )?;
        tracing::info!("category {id} renamed to \"{name}\"");
        self.get_category(user, id)
    }

    /// Transactions in the category become uncategorized.
    pub(crate) fn delete_category(&self, user: &User, id: i64) -> Result<()> {
        self.get_custom_category(user, id)?;
        self.conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        tracing::info!("category {id} deleted");
        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    fn check_category(&self, user: &User, category_id: Option<i64>) -> Result<()> {
        if let Some(id) = category_id {
            match self.get_category(user, id) {
                Ok(_) => {}
                Err(Error::NotFound) => return Err(Error::InvalidCategory(id)),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub(crate) fn create_transaction(
        &self,
        user: &User,
        txn: &ValidTransaction,
    ) -> Result<Transaction> {
        self.check_category(user, txn.category_id)?;
        let now = now();
        self.conn.execute(
            "INSERT INTO transactions (user_id, amount, description, date, type, category_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                user.external_id,
                amount_text(txn.amount),
                txn.description,
                txn.date.format(DATE_FORMAT).to_string(),
                txn.transaction_type.as_str(),
                txn.category_id,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(
            "transaction {id} created: {} {} on {}",
            txn.transaction_type,
            txn.amount,
            txn.date
        );
        self.get_transaction(user, id)
    }

    /// Replace a transaction's fields. A `None` category keeps the current
    /// one.
    pub(crate) fn update_transaction(
        &self,
        user: &User,
        id: i64,
        txn: &ValidTransaction,
    ) -> Result<Transaction> {
        self.get_transaction(user, id)?;
        self.check_category(user, txn.category_id)?;
        self.conn.execute(
            "UPDATE transactions
             SET amount = ?1, description = ?2, date = ?3, type = ?4,
                 category_id = COALESCE(?5, category_id), updated_at = ?6
             WHERE id = ?7 AND user_id = ?8",
            params![
                amount_text(txn.amount),
                txn.description,
                txn.date.format(DATE_FORMAT).to_string(),
                txn.transaction_type.as_str(),
                txn.category_id,
                now(),
                id,
                user.external_id,
            ],
        )?;
        tracing::info!("transaction {id} updated");
        self.get_transaction(user, id)
    }

    pub(crate) fn delete_transaction(&self, user: &User, id: i64) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
            params![id, user.external_id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound);
        }
        tracing::info!("transaction {id} deleted");
        Ok(())
    }

    pub(crate) fn get_transaction(&self, user: &User, id: i64) -> Result<Transaction> {
        let raw = self.conn.query_row(
            &format!("{TRANSACTION_SELECT} WHERE t.id = ?1 AND t.user_id = ?2"),
            params![id, user.external_id],
            read_raw_transaction,
        )?;
        raw.into_transaction()
    }

    /// Newest first.
    pub(crate) fn get_transactions(
        &self,
        user: &User,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        let mut sql = format!("{TRANSACTION_SELECT} WHERE t.user_id = ?1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
            vec![Box::new(user.external_id.clone())];

        if let Some(kind) = filter.transaction_type {
            sql.push_str(&format!(" AND t.type = ?{}", param_values.len() + 1));
            param_values.push(Box::new(kind.as_str()));
        }
        if let Some(start) = filter.start {
            sql.push_str(&format!(" AND t.date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = filter.end {
            sql.push_str(&format!(" AND t.date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(end.format(DATE_FORMAT).to_string()));
        }

        sql.push_str(" ORDER BY t.date DESC, t.id DESC");

        if let Some(l) = filter.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), read_raw_transaction)?;
        let transactions = rows
            .map(|raw| raw?.into_transaction())
            .collect::<Result<Vec<_>>>()?;
        Ok(transactions)
    }

    /// Raw rows for the aggregation engine, between two inclusive days.
    /// Amount and type are handed over untouched.
    pub(crate) fn get_ledger_rows(
        &self,
        user: &User,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LedgerRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, CAST(t.amount AS TEXT), t.type, c.name, t.date
             FROM transactions t LEFT JOIN categories c ON t.category_id = c.id
             WHERE t.user_id = ?1 AND t.date >= ?2 AND t.date <= ?3
             ORDER BY t.date DESC, t.id DESC",
        )?;
        let rows = stmt.query_map(
            params![
                user.external_id,
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string(),
            ],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )?;
        let ledger = rows
            .map(|row| {
                let (id, amount, kind, category_name, date) = row?;
                Ok(LedgerRow {
                    id: id.to_string(),
                    amount,
                    kind,
                    category_name,
                    date: parse_stored_date(&date)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ledger)
    }

    pub(crate) fn get_transaction_count(&self, user: &User) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?1",
            params![user.external_id],
            |row| row.get(0),
        )?)
    }

    // ── Preferences ───────────────────────────────────────────

    pub(crate) fn get_preference(&self, user: &User, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE user_id = ?1 AND key = ?2",
                params![user.external_id, key],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub(crate) fn set_preference(&self, user: &User, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO preferences (user_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, key) DO UPDATE SET value = ?3",
            params![user.external_id, key, value],
        )?;
        Ok(())
    }
}

fn seed_categories(conn: &Connection, external_id: &str, now: &str) -> Result<()> {
    for name in PREDEFINED_CATEGORIES {
        conn.execute(
            "INSERT OR IGNORE INTO categories (user_id, name, is_custom, created_at, updated_at)
             VALUES (?1, ?2, 0, ?3, ?3)",
            params![external_id, name, now],
        )?;
    }
    Ok(())
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Amounts are stored with exactly two decimals.
fn amount_text(amount: Decimal) -> String {
    format!("{amount:.2}")
}

fn parse_stored_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| Error::CorruptRecord {
        column: "date",
        value: value.to_string(),
    })
}

fn read_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        external_id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn read_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        is_custom: row.get(2)?,
    })
}

/// A transaction row before its text columns are checked.
struct RawTransaction {
    id: i64,
    amount: String,
    description: String,
    date: String,
    kind: String,
    category_id: Option<i64>,
    category_name: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_raw_transaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTransaction> {
    Ok(RawTransaction {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        date: row.get(3)?,
        kind: row.get(4)?,
        category_id: row.get(5)?,
        category_name: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl RawTransaction {
    fn into_transaction(self) -> Result<Transaction> {
        let amount = Decimal::from_str(&self.amount).map_err(|_| Error::CorruptRecord {
            column: "amount",
            value: self.amount.clone(),
        })?;
        let transaction_type =
            TransactionType::parse(&self.kind).ok_or_else(|| Error::CorruptRecord {
                column: "type",
                value: self.kind.clone(),
            })?;
        Ok(Transaction {
            id: self.id,
            amount,
            description: self.description,
            date: parse_stored_date(&self.date)?,
            transaction_type,
            category_id: self.category_id,
            category_name: self.category_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
