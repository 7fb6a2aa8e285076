use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::RawRow;
use crate::store::Storage;
use crate::validator::parse_date;

/// Identity of a financial record for duplicate detection. Stored amounts
/// are always positive, so the magnitude is compared, with trailing zeros
/// dropped so `50` and `50.00` agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    date: DateTime<Utc>,
    amount: Decimal,
    description: String,
}

impl Signature {
    pub fn new(date: DateTime<Utc>, amount: Decimal, description: &str) -> Self {
        Self {
            date,
            amount: amount.abs().normalize(),
            description: description.trim().to_string(),
        }
    }
}

pub struct DuplicateIndex {
    seen: HashSet<Signature>,
}

impl DuplicateIndex {
    /// Load signatures of the user's stored transactions that fall within
    /// the date span of `rows`. Rows without a parsable date don't widen
    /// the span; if none parse, storage is not queried at all.
    pub fn build(store: &impl Storage, user_id: &str, rows: &[RawRow]) -> Result<Self> {
        let dates: Vec<DateTime<Utc>> = rows.iter().filter_map(|r| parse_date(&r.date)).collect();
        let (Some(from), Some(to)) = (dates.iter().min(), dates.iter().max()) else {
            return Ok(Self { seen: HashSet::new() });
        };

        let seen = store
            .find_transactions_in_range(user_id, *from, *to)?
            .into_iter()
            .map(|stored| Signature::new(stored.date, stored.amount, &stored.description))
            .collect();
        Ok(Self { seen })
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.seen.contains(signature)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }
}
