use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::TransactionBehavior;

use crate::cli::{open_db, resolve_user};
use crate::error::{MonetaError, Result};
use crate::importer::import_transactions;
use crate::models::ImportResult;
use crate::settings::load_settings;
use crate::store::SqliteStore;

/// Reject anything that isn't a `.csv` file within the size limit before
/// the import reads it.
pub fn check_upload(path: &Path, max_bytes: u64) -> Result<()> {
    let is_csv = path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(MonetaError::UnsupportedFile(format!(
            "{} (only .csv files can be imported)",
            path.display()
        )));
    }
    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(MonetaError::FileTooLarge {
            size,
            limit: max_bytes,
        });
    }
    Ok(())
}

pub fn run(file: &str, user: Option<String>, json: bool) -> Result<()> {
    let settings = load_settings();
    let path = Path::new(file);
    check_upload(path, settings.max_upload_bytes)?;
    let bytes = std::fs::read(path)?;

    let user_id = resolve_user(&settings, user);
    let mut conn = open_db(&settings)?;

    // Holding the write lock for the whole run keeps a concurrent import
    // from slipping rows past the duplicate check.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let result = import_transactions(&SqliteStore::new(&tx), &bytes, &user_id)?;
    tx.commit()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn print_summary(result: &ImportResult) {
    let message = if result.failed_count == 0 {
        result.message.green()
    } else if result.success_count == 0 {
        result.message.red()
    } else {
        result.message.yellow()
    };
    println!("{message}");

    if !result.auto_created_categories.is_empty() {
        println!(
            "New categories: {}",
            result.auto_created_categories.join(", ")
        );
    }

    if result.failed_rows.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Row", "Date", "Amount", "Description", "Errors"]);
    for failed in &result.failed_rows {
        table.add_row(vec![
            Cell::new(failed.row_number),
            Cell::new(&failed.row_data.date),
            Cell::new(&failed.row_data.amount),
            Cell::new(&failed.row_data.description),
            Cell::new(failed.errors.join("\n")),
        ]);
    }
    println!("Failed rows\n{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_csv_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.xlsx");
        std::fs::write(&path, "date,amount\n").unwrap();
        let err = check_upload(&path, 1024).unwrap_err();
        assert!(matches!(err, MonetaError::UnsupportedFile(_)));
    }

    #[test]
    fn test_suffix_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("STATEMENT.CSV");
        std::fs::write(&path, "date,amount\n").unwrap();
        check_upload(&path, 1024).unwrap();
    }

    #[test]
    fn test_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.csv");
        std::fs::write(&path, vec![b'a'; 2048]).unwrap();
        let err = check_upload(&path, 1024).unwrap_err();
        assert!(matches!(err, MonetaError::FileTooLarge { size: 2048, limit: 1024 }));
    }
}
