//! In-memory `Storage` used by unit tests. Counts every call and can be
//! told to fail specific operations.

use std::cell::RefCell;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{MonetaError, Result};
use crate::models::{Category, NewCategory, NewTransaction, StoredSignature, Transaction, TransactionType};
use crate::store::Storage;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub range_lookups: usize,
    pub category_lookups: usize,
    pub category_creates: usize,
    pub transaction_creates: usize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.range_lookups + self.category_lookups + self.category_creates + self.transaction_creates
    }
}

#[derive(Default)]
pub struct MemoryStore {
    categories: RefCell<Vec<Category>>,
    transactions: RefCell<Vec<Transaction>>,
    calls: RefCell<Calls>,
    fail_range_lookup: bool,
    fail_description: Option<String>,
    fail_category: Option<String>,
}

impl MemoryStore {
    /// Range lookups fail, as if storage were unreachable.
    pub fn unreachable() -> Self {
        Self {
            fail_range_lookup: true,
            ..Default::default()
        }
    }

    pub fn failing_transaction(description: &str) -> Self {
        Self {
            fail_description: Some(description.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_category(name: &str) -> Self {
        Self {
            fail_category: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Calls {
        *self.calls.borrow()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.categories.borrow().clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.borrow().clone()
    }

    pub fn seed_category(&self, user_id: &str, name: &str, category_type: TransactionType) -> i64 {
        let mut categories = self.categories.borrow_mut();
        let id = categories.len() as i64 + 1;
        categories.push(Category {
            id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            category_type,
            icon: "wallet".to_string(),
            color: "#000000".to_string(),
        });
        id
    }

    pub fn seed_transaction(
        &self,
        user_id: &str,
        category_id: i64,
        date: DateTime<Utc>,
        amount: &str,
        description: &str,
    ) {
        let mut transactions = self.transactions.borrow_mut();
        let id = transactions.len() as i64 + 1;
        transactions.push(Transaction {
            id,
            user_id: user_id.to_string(),
            category_id,
            amount: Decimal::from_str(amount).unwrap(),
            description: description.to_string(),
            date,
            txn_type: TransactionType::Expense,
        });
    }
}

impl Storage for MemoryStore {
    fn find_transactions_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredSignature>> {
        self.calls.borrow_mut().range_lookups += 1;
        if self.fail_range_lookup {
            return Err(MonetaError::Other("storage unreachable".to_string()));
        }
        Ok(self
            .transactions
            .borrow()
            .iter()
            .filter(|t| t.user_id == user_id && t.date >= from && t.date <= to)
            .map(|t| StoredSignature {
                date: t.date,
                amount: t.amount,
                description: t.description.clone(),
            })
            .collect())
    }

    fn find_category(
        &self,
        user_id: &str,
        name: &str,
        category_type: TransactionType,
    ) -> Result<Option<Category>> {
        self.calls.borrow_mut().category_lookups += 1;
        let wanted = name.to_lowercase();
        Ok(self
            .categories
            .borrow()
            .iter()
            .find(|c| c.user_id == user_id && c.category_type == category_type && c.name.to_lowercase() == wanted)
            .cloned())
    }

    fn create_category(&self, category: &NewCategory<'_>) -> Result<Category> {
        self.calls.borrow_mut().category_creates += 1;
        if self.fail_category.as_deref() == Some(category.name) {
            return Err(MonetaError::Other("category insert rejected".to_string()));
        }
        let mut categories = self.categories.borrow_mut();
        let created = Category {
            id: categories.len() as i64 + 1,
            user_id: category.user_id.to_string(),
            name: category.name.to_string(),
            category_type: category.category_type,
            icon: category.icon.to_string(),
            color: category.color.to_string(),
        };
        categories.push(created.clone());
        Ok(created)
    }

    fn create_transaction(&self, txn: &NewTransaction<'_>) -> Result<Transaction> {
        self.calls.borrow_mut().transaction_creates += 1;
        if self.fail_description.as_deref() == Some(txn.description) {
            return Err(MonetaError::Other("insert rejected".to_string()));
        }
        let mut transactions = self.transactions.borrow_mut();
        let created = Transaction {
            id: transactions.len() as i64 + 1,
            user_id: txn.user_id.to_string(),
            category_id: txn.category_id,
            amount: txn.amount,
            description: txn.description.to_string(),
            date: txn.date,
            txn_type: txn.txn_type,
        };
        transactions.push(created.clone());
        Ok(created)
    }
}
