use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use rust_decimal::Decimal;

use crate::models::{RawRow, TransactionType};

pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_CATEGORY_NAME_CHARS: usize = 100;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO 8601 date or date-time. Values without an offset are UTC;
/// a bare date means midnight UTC. Instants are cut to whole milliseconds,
/// the precision they are stored at, and only four-digit years are accepted.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    parse_instant_text(raw.trim())
        .filter(|dt| (0..=9999).contains(&dt.year()))
        .map(|dt| dt.trunc_subsecs(3))
}

fn parse_instant_text(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a signed decimal amount, keeping the scale as written. Digit
/// separators are not numbers.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.contains('_') {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

pub fn validate(row: &RawRow) -> Vec<String> {
    let mut errors = Vec::new();

    let date = row.date.trim();
    if date.is_empty() {
        errors.push("Date is required".to_string());
    } else if parse_date(date).is_none() {
        errors.push("Invalid date format. Use ISO 8601 (YYYY-MM-DD)".to_string());
    }

    let amount = row.amount.trim();
    if amount.is_empty() {
        errors.push("Amount is required".to_string());
    } else if parse_amount(amount).map_or(true, |a| a.is_zero()) {
        errors.push("Amount must be a non-zero number".to_string());
    }

    let description = row.description.trim();
    if description.is_empty() {
        errors.push("Description is required".to_string());
    } else if description.chars().count() > MAX_DESCRIPTION_CHARS {
        errors.push(format!(
            "Description must not exceed {MAX_DESCRIPTION_CHARS} characters"
        ));
    }

    let category_name = row.category_name.trim();
    if category_name.is_empty() {
        errors.push("Category name is required".to_string());
    } else if category_name.chars().count() > MAX_CATEGORY_NAME_CHARS {
        errors.push(format!(
            "Category name must not exceed {MAX_CATEGORY_NAME_CHARS} characters"
        ));
    }

    if let Some(kind) = &row.txn_type {
        if TransactionType::parse(kind).is_none() {
            errors.push("Type must be INCOME or EXPENSE".to_string());
        }
    }

    errors
}
