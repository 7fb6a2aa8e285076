use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::category_resolver::CategoryCache;
use crate::dedup::{DuplicateIndex, Signature};
use crate::error::{MonetaError, Result};
use crate::models::{FailedRow, ImportResult, NewTransaction, RawRow, Transaction, TransactionType};
use crate::parser::parse_rows;
use crate::store::Storage;
use crate::validator::{parse_amount, parse_date, validate};

pub const DUPLICATE_ERROR: &str = "Duplicate transaction detected (same date, amount, and description)";

/// Row numbers as a user sees them in a spreadsheet: the header is line 1.
const FIRST_DATA_ROW: usize = 2;

// ---------------------------------------------------------------------------
// Transaction writer
// ---------------------------------------------------------------------------

/// Persist one row that already passed validation and the duplicate check.
/// The sign only decides the type; the stored amount is its magnitude.
pub fn write_transaction(
    store: &impl Storage,
    user_id: &str,
    category_id: i64,
    date: DateTime<Utc>,
    amount: Decimal,
    description: &str,
    txn_type: TransactionType,
) -> Result<Transaction> {
    store.create_transaction(&NewTransaction {
        user_id,
        category_id,
        amount: amount.abs(),
        description: description.trim(),
        date,
        txn_type,
    })
}

// ---------------------------------------------------------------------------
// Per-row state machine
// ---------------------------------------------------------------------------

enum RowOutcome {
    Succeeded(Transaction),
    Failed(Vec<String>),
}

fn infer_type(row: &RawRow, amount: Decimal) -> TransactionType {
    match row.txn_type.as_deref().and_then(TransactionType::parse) {
        Some(explicit) => explicit,
        None if amount.is_sign_negative() => TransactionType::Expense,
        None => TransactionType::Income,
    }
}

/// State owned by one import run and dropped at its end.
struct ImportRun<'s, S: Storage> {
    store: &'s S,
    user_id: &'s str,
    duplicates: DuplicateIndex,
    categories: CategoryCache,
    auto_created: Vec<String>,
}

impl<S: Storage> ImportRun<'_, S> {
    fn process(&mut self, row: &RawRow) -> RowOutcome {
        let errors = validate(row);
        let (true, Some(date), Some(amount)) = (
            errors.is_empty(),
            parse_date(&row.date),
            parse_amount(&row.amount),
        ) else {
            return RowOutcome::Failed(errors);
        };

        if self.duplicates.contains(&Signature::new(date, amount, &row.description)) {
            return RowOutcome::Failed(vec![DUPLICATE_ERROR.to_string()]);
        }

        let txn_type = infer_type(row, amount);

        let resolved = match self
            .categories
            .resolve(self.store, &row.category_name, txn_type, self.user_id)
        {
            Ok(resolved) => resolved,
            Err(e) => return storage_failure(e),
        };
        if !resolved.existed {
            let name = row.category_name.trim();
            if !self.auto_created.iter().any(|n| n == name) {
                self.auto_created.push(name.to_string());
            }
        }

        match write_transaction(
            self.store,
            self.user_id,
            resolved.category_id,
            date,
            amount,
            &row.description,
            txn_type,
        ) {
            Ok(txn) => RowOutcome::Succeeded(txn),
            Err(e) => storage_failure(e),
        }
    }
}

fn storage_failure(e: MonetaError) -> RowOutcome {
    warn!("row failed on storage error: {e}");
    RowOutcome::Failed(vec![format!("Failed to create transaction: {e}")])
}

fn summary_message(success: usize, failed: usize) -> String {
    let total = success + failed;
    if failed == 0 {
        format!("Successfully imported {success} transactions")
    } else if success == 0 {
        format!("Failed to import all {total} transactions. See error details below")
    } else {
        format!("Imported {success} of {total} transactions. {failed} rows failed validation")
    }
}

// ---------------------------------------------------------------------------
// import_transactions
// ---------------------------------------------------------------------------

/// Import a CSV file for `user_id`.
///
/// Only a malformed file or a storage failure before the first row is
/// processed returns `Err`. Every row-level problem is reported in the
/// returned `ImportResult` and the remaining rows still run.
pub fn import_transactions(store: &impl Storage, bytes: &[u8], user_id: &str) -> Result<ImportResult> {
    let rows = parse_rows(bytes)?;
    if rows.is_empty() {
        return Ok(ImportResult {
            message: "CSV file is empty".to_string(),
            ..Default::default()
        });
    }

    let duplicates = DuplicateIndex::build(store, user_id, &rows)?;
    debug!(
        "loaded {} existing transaction signatures for {} rows",
        duplicates.len(),
        rows.len()
    );

    let mut run = ImportRun {
        store,
        user_id,
        duplicates,
        categories: CategoryCache::default(),
        auto_created: Vec::new(),
    };

    let mut success_count = 0usize;
    let mut failed_rows = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let row_number = idx + FIRST_DATA_ROW;
        match run.process(row) {
            RowOutcome::Succeeded(txn) => {
                debug!(
                    "row {row_number}: stored {} {} '{}' on {} as transaction {} (category {}, user {})",
                    txn.txn_type, txn.amount, txn.description, txn.date, txn.id, txn.category_id, txn.user_id
                );
                success_count += 1;
            }
            RowOutcome::Failed(errors) => {
                debug!("row {row_number}: {}", errors.join("; "));
                failed_rows.push(FailedRow {
                    row_number,
                    row_data: row.clone(),
                    errors,
                });
            }
        }
    }

    let failed_count = failed_rows.len();
    let message = summary_message(success_count, failed_count);
    info!("import for user {user_id}: {message}");

    Ok(ImportResult {
        success_count,
        failed_count,
        total_rows: success_count + failed_count,
        failed_rows,
        auto_created_categories: run.auto_created,
        message,
    })
}
