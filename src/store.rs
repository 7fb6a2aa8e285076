use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rusqlite::{Connection, Row};

use crate::db::{format_instant, parse_instant};
use crate::error::{MonetaError, Result};
use crate::models::{Category, NewCategory, NewTransaction, StoredSignature, Transaction, TransactionType};

/// Persistence operations the import pipeline depends on. Every call is
/// scoped to one user.
pub trait Storage {
    /// Stored transactions whose date falls in `[from, to]`, inclusive.
    fn find_transactions_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredSignature>>;

    /// Case-insensitive on `name`, exact on `category_type`.
    fn find_category(
        &self,
        user_id: &str,
        name: &str,
        category_type: TransactionType,
    ) -> Result<Option<Category>>;

    fn create_category(&self, category: &NewCategory<'_>) -> Result<Category>;

    fn create_transaction(&self, txn: &NewTransaction<'_>) -> Result<Transaction>;
}

pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn column_type(raw: &str) -> rusqlite::Result<TransactionType> {
    TransactionType::parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown transaction type: {raw}").into(),
        )
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    let kind: String = row.get(3)?;
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        category_type: column_type(&kind)?,
        icon: row.get(4)?,
        color: row.get(5)?,
    })
}

pub fn parse_stored_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| MonetaError::Other(format!("Corrupt stored amount '{raw}': {e}")))
}

impl Storage for SqliteStore<'_> {
    fn find_transactions_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredSignature>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT date, amount, description FROM transactions \
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3",
        )?;
        let rows: Vec<(String, String, String)> = stmt
            .query_map(
                rusqlite::params![user_id, format_instant(&from), format_instant(&to)],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(date, amount, description)| {
                Ok(StoredSignature {
                    date: parse_instant(&date)?,
                    amount: parse_stored_amount(&amount)?,
                    description,
                })
            })
            .collect()
    }

    fn find_category(
        &self,
        user_id: &str,
        name: &str,
        category_type: TransactionType,
    ) -> Result<Option<Category>> {
        // SQLite's lower() only folds ASCII, so compare in Rust.
        let wanted = name.to_lowercase();
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, user_id, name, category_type, icon, color FROM categories \
             WHERE user_id = ?1 AND category_type = ?2 ORDER BY id",
        )?;
        let candidates = stmt
            .query_map(rusqlite::params![user_id, category_type.as_str()], category_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(candidates.into_iter().find(|c| c.name.to_lowercase() == wanted))
    }

    fn create_category(&self, category: &NewCategory<'_>) -> Result<Category> {
        self.conn.execute(
            "INSERT INTO categories (user_id, name, category_type, icon, color) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                category.user_id,
                category.name,
                category.category_type.as_str(),
                category.icon,
                category.color
            ],
        )?;
        Ok(Category {
            id: self.conn.last_insert_rowid(),
            user_id: category.user_id.to_string(),
            name: category.name.to_string(),
            category_type: category.category_type,
            icon: category.icon.to_string(),
            color: category.color.to_string(),
        })
    }

    fn create_transaction(&self, txn: &NewTransaction<'_>) -> Result<Transaction> {
        self.conn.execute(
            "INSERT INTO transactions (user_id, category_id, amount, description, date, txn_type) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                txn.user_id,
                txn.category_id,
                txn.amount.to_string(),
                txn.description,
                format_instant(&txn.date),
                txn.txn_type.as_str()
            ],
        )?;
        Ok(Transaction {
            id: self.conn.last_insert_rowid(),
            user_id: txn.user_id.to_string(),
            category_id: txn.category_id,
            amount: txn.amount,
            description: txn.description.to_string(),
            date: txn.date,
            txn_type: txn.txn_type,
        })
    }
}
