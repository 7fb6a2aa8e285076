use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, resolve_user};
use crate::error::Result;
use crate::fmt::money;
use crate::models::TransactionType;
use crate::settings::load_settings;
use crate::store::parse_stored_amount;

pub fn list(user: Option<String>, limit: u32) -> Result<()> {
    let settings = load_settings();
    let user_id = resolve_user(&settings, user);
    let conn = open_db(&settings)?;

    let mut stmt = conn.prepare(
        "SELECT t.id, t.date, t.description, t.amount, t.txn_type, c.name \
         FROM transactions t JOIN categories c ON t.category_id = c.id \
         WHERE t.user_id = ?1 ORDER BY t.date DESC, t.id DESC LIMIT ?2",
    )?;
    let rows: Vec<(i64, String, String, String, String, String)> = stmt
        .query_map(rusqlite::params![user_id, limit], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Category"]);
    for (id, date, description, amount, kind, category) in rows {
        let amount = parse_stored_amount(&amount)?;
        let amt = match TransactionType::parse(&kind) {
            Some(TransactionType::Expense) => money(-amount).red().to_string(),
            _ => money(amount).green().to_string(),
        };
        table.add_row(vec![
            Cell::new(id),
            Cell::new(date.get(..10).unwrap_or(date.as_str())),
            Cell::new(description),
            Cell::new(amt),
            Cell::new(category),
        ]);
    }
    println!("Transactions\n{table}");
    Ok(())
}
