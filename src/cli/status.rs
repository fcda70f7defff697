use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::models::EntryType;
use crate::settings::{get_data_dir, get_db_path, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = get_data_dir();
    let db_path = get_db_path();

    println!("User:       {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let categories: i64 = conn.query_row("SELECT count(*) FROM category", [], |r| r.get(0))?;
        let budgets: i64 = conn.query_row("SELECT count(*) FROM budget", [], |r| r.get(0))?;
        let unreconciled: i64 = conn.query_row(
            "SELECT count(*) FROM entry WHERE reconciled = 0",
            [],
            |r| r.get(0),
        )?;

        println!();
        println!("Categories:    {categories}");
        println!("Budgets:       {budgets}");
        for t in EntryType::ALL {
            let count: i64 =
                conn.query_row("SELECT count(*) FROM entry WHERE type = ?1", [t.tag()], |r| r.get(0))?;
            println!("{:<15}{count}", format!("{}s:", t.label()));
        }
        println!("Unreconciled:  {unreconciled}");
    } else {
        println!();
        println!("Database not found. Run `homefinance init` to set up.");
    }

    Ok(())
}
