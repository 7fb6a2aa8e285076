use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{MonetaError, Result};
use crate::models::RawRow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted { opened_at: u64 },
    QuoteInQuoted { opened_at: u64 },
}

/// Walks the text once with RFC 4180 quoting rules. The csv reader is
/// forgiving about stray and unterminated quotes, which would silently
/// merge rows, so malformed quoting is rejected here first.
fn check_quoting(text: &str) -> Result<()> {
    let mut line: u64 = 1;
    let mut state = QuoteState::FieldStart;

    for c in text.chars() {
        state = match (state, c) {
            (QuoteState::Unquoted, '"') => {
                return Err(MonetaError::Parse(format!(
                    "Invalid opening quote inside an unquoted field on line {line}"
                )));
            }
            (QuoteState::FieldStart, '"') => QuoteState::Quoted { opened_at: line },
            (QuoteState::FieldStart | QuoteState::Unquoted, ',' | '\r' | '\n') => QuoteState::FieldStart,
            (QuoteState::FieldStart | QuoteState::Unquoted, _) => QuoteState::Unquoted,
            (QuoteState::Quoted { opened_at }, '"') => QuoteState::QuoteInQuoted { opened_at },
            (QuoteState::Quoted { opened_at }, _) => QuoteState::Quoted { opened_at },
            (QuoteState::QuoteInQuoted { opened_at }, '"') => QuoteState::Quoted { opened_at },
            (QuoteState::QuoteInQuoted { .. }, ',' | '\r' | '\n') => QuoteState::FieldStart,
            (QuoteState::QuoteInQuoted { .. }, _) => {
                return Err(MonetaError::Parse(format!(
                    "Invalid closing quote: unexpected character '{c}' after a quoted field on line {line}"
                )));
            }
        };
        if c == '\n' {
            line += 1;
        }
    }

    if let QuoteState::Quoted { opened_at } = state {
        return Err(MonetaError::Parse(format!(
            "Quoted field starting on line {opened_at} is not terminated"
        )));
    }
    Ok(())
}

struct Columns {
    date: Option<usize>,
    amount: Option<usize>,
    description: Option<usize>,
    category_name: Option<usize>,
    txn_type: Option<usize>,
    notes: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Self {
        let find = |name: &str| header.iter().position(|h| h == name);
        Self {
            date: find("date"),
            amount: find("amount"),
            description: find("description"),
            category_name: find("categoryName"),
            txn_type: find("type"),
            notes: find("notes"),
        }
    }

    fn get<'r>(record: &'r StringRecord, idx: Option<usize>) -> &'r str {
        idx.and_then(|i| record.get(i)).unwrap_or("")
    }

    fn optional(record: &StringRecord, idx: Option<usize>) -> Option<String> {
        let value = Self::get(record, idx);
        (!value.is_empty()).then(|| value.to_string())
    }

    fn to_row(&self, record: &StringRecord) -> RawRow {
        RawRow {
            date: Self::get(record, self.date).to_string(),
            amount: Self::get(record, self.amount).to_string(),
            description: Self::get(record, self.description).to_string(),
            category_name: Self::get(record, self.category_name).to_string(),
            txn_type: Self::optional(record, self.txn_type),
            notes: Self::optional(record, self.notes),
        }
    }
}

fn is_blank(row: &RawRow) -> bool {
    row.date.is_empty()
        && row.amount.is_empty()
        && row.description.is_empty()
        && row.category_name.is_empty()
        && row.txn_type.is_none()
        && row.notes.is_none()
}

/// Parse an import file into rows keyed by header name.
///
/// Blank rows are dropped entirely, so downstream row numbers only count
/// rows that carry data. Any syntax problem fails the whole file.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| MonetaError::Parse(format!("File is not valid UTF-8 text: {e}")))?;
    check_quoting(text)?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let header = rdr
        .headers()
        .map_err(|e| MonetaError::Parse(e.to_string()))?
        .clone();
    let columns = Columns::from_header(&header);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| MonetaError::Parse(e.to_string()))?;
        let row = columns.to_row(&record);
        if is_blank(&row) {
            continue;
        }
        if record.len() != header.len() {
            let line = record.position().map_or(0, |p| p.line());
            return Err(MonetaError::Parse(format!(
                "Line {line} has {} fields but the header has {}",
                record.len(),
                header.len()
            )));
        }
        rows.push(row);
    }
    Ok(rows)
}
