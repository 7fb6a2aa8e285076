use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("User:        {}", settings.user_id);
    println!("Data dir:    {}", settings.data_dir);
    println!("Database:    {}", db_path.display());
    println!("Upload max:  {}", format_bytes(settings.max_upload_bytes));

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:     {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let categories: i64 = conn.query_row(
            "SELECT count(*) FROM categories WHERE user_id = ?1",
            [&settings.user_id],
            |r| r.get(0),
        )?;
        let transactions: i64 = conn.query_row(
            "SELECT count(*) FROM transactions WHERE user_id = ?1",
            [&settings.user_id],
            |r| r.get(0),
        )?;

        println!();
        println!("Categories:    {categories}");
        println!("Transactions:  {transactions}");
    } else {
        println!();
        println!("Database not found. Run `moneta init` to set up.");
    }

    Ok(())
}
