use std::path::Path;

use rusqlite::Connection;

use crate::dao::{BudgetDao, CategoryDao, GenericDao};
use crate::error::Result;
use crate::models::{Budget, Category};

pub const DB_FILE: &str = "finance.db";

const CATEGORY_TABLE: &str = "
CREATE TABLE IF NOT EXISTS category (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT UNIQUE NOT NULL
)";

const BUDGET_TABLE: &str = "
CREATE TABLE IF NOT EXISTS budget (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER NOT NULL,
    budget_amt  REAL CHECK(budget_amt >= 0),
    actual_amt  REAL,
    FOREIGN KEY (category_id) REFERENCES category(id)
)";

const ENTRY_TABLE: &str = "
CREATE TABLE IF NOT EXISTS entry (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT,
    type        TEXT    CHECK(type = 'in' OR type = 'out' OR type = 'balance'),
    recurring   INTEGER CHECK(recurring = 0 OR recurring = 1),
    amount      REAL    CHECK(amount >= 0),
    comment     TEXT,
    url         TEXT,
    paid        INTEGER CHECK(paid = 0 OR paid = 1),
    date        TEXT    NOT NULL,
    reconciled  INTEGER CHECK(reconciled = 0 OR reconciled = 1),
    category_id INTEGER,
    FOREIGN KEY (category_id) REFERENCES category(id)
)";

const DEFAULT_CATEGORIES: &[&str] = &[
    "Miscellaneous",
    "Housing",
    "Utilities",
    "Food",
    "Automotive",
    "Medical",
    "Entertainment",
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn is_initialized(db_path: &Path) -> bool {
    db_path.exists()
}

/// Create all tables in a single transaction. Nothing is created if any
/// statement fails.
pub fn create_tables(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for ddl in [CATEGORY_TABLE, BUDGET_TABLE, ENTRY_TABLE] {
        if let Err(e) = tx.execute(ddl, []) {
            tracing::error!(error = %e, "error creating tables");
            return Err(e.into());
        }
    }
    tx.commit()?;
    Ok(())
}

/// Seed the default categories, each with a zero budget. Only runs against
/// an empty category table.
pub fn populate_tables(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT count(*) FROM category", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let categories = CategoryDao::new(conn);
    let budgets = BudgetDao::new(conn);
    for description in DEFAULT_CATEGORIES {
        match Category::new(description).and_then(|c| categories.create(c)) {
            Ok(category) => {
                budgets.create(Budget::for_category(category))?;
            }
            Err(e) => {
                tracing::warn!(%description, error = %e, "could not create category");
            }
        }
    }
    Ok(())
}

pub fn init_db(conn: &Connection) -> Result<()> {
    create_tables(conn)?;
    populate_tables(conn)
}
