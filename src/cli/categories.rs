use comfy_table::{Cell, Table};

use crate::cli::{open_db, resolve_user};
use crate::error::Result;
use crate::settings::load_settings;

pub fn list(user: Option<String>) -> Result<()> {
    let settings = load_settings();
    let user_id = resolve_user(&settings, user);
    let conn = open_db(&settings)?;

    let mut stmt = conn.prepare(
        "SELECT id, name, category_type, icon, color FROM categories \
         WHERE user_id = ?1 ORDER BY category_type, name",
    )?;
    let rows: Vec<(i64, String, String, String, String)> = stmt
        .query_map([&user_id], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        println!("No categories for {user_id}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type", "Icon", "Color"]);
    for (id, name, kind, icon, color) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(name),
            Cell::new(kind),
            Cell::new(icon),
            Cell::new(color),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}
