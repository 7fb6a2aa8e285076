use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }

    /// Exact, case-sensitive match on the stored/CSV spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "INCOME" => Some(Self::Income),
            "EXPENSE" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub category_type: TransactionType,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub category_id: i64,
    pub amount: Decimal,
    pub description: String,
    pub date: DateTime<Utc>,
    pub txn_type: TransactionType,
}

#[derive(Debug, Clone)]
pub struct NewCategory<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    pub category_type: TransactionType,
    pub icon: &'a str,
    pub color: &'a str,
}

#[derive(Debug, Clone)]
pub struct NewTransaction<'a> {
    pub user_id: &'a str,
    pub category_id: i64,
    pub amount: Decimal,
    pub description: &'a str,
    pub date: DateTime<Utc>,
    pub txn_type: TransactionType,
}

/// The subset of a stored transaction the duplicate check needs.
#[derive(Debug, Clone)]
pub struct StoredSignature {
    pub date: DateTime<Utc>,
    pub amount: Decimal,
    pub description: String,
}

/// One data line of an import file, fields trimmed but otherwise untyped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRow {
    pub date: String,
    pub amount: String,
    pub description: String,
    pub category_name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub txn_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRow {
    pub row_number: usize,
    pub row_data: RawRow,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub total_rows: usize,
    pub failed_rows: Vec<FailedRow>,
    pub auto_created_categories: Vec<String>,
    pub message: String,
}
