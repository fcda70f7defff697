use comfy_table::{Cell, Table};
use rusqlite::Connection;

use super::open_db;
use crate::dao::{CategoryDao, GenericDao};
use crate::error::{HomeFinanceError, Result};
use crate::models::Category;

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let categories = CategoryDao::new(&conn).list()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Description"]);
    for cat in categories {
        table.add_row(vec![Cell::new(cat.id), Cell::new(cat.description)]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn add(description: &str) -> Result<()> {
    let conn = open_db()?;
    let created = CategoryDao::new(&conn).create(Category::new(description.trim())?)?;
    println!("Added category {}: {}", created.id, created.description);
    Ok(())
}

pub fn rename(id: i64, description: &str) -> Result<()> {
    let conn = open_db()?;
    let category = Category::with_id(id, description.trim())?;
    if !CategoryDao::new(&conn).update(&category)? {
        return Err(HomeFinanceError::NotFound(format!("Category {id}")));
    }
    println!("Renamed category {id} to: {}", category.description);
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_db()?;
    if let Some(reason) = blocking_reason(&conn, id)? {
        return Err(HomeFinanceError::Other(reason));
    }
    if !CategoryDao::new(&conn).delete(id)? {
        return Err(HomeFinanceError::NotFound(format!("Category {id}")));
    }
    println!("Deleted category {id}");
    Ok(())
}

/// Why a category cannot be deleted yet, or `None` when nothing refers to it.
pub fn blocking_reason(conn: &Connection, id: i64) -> Result<Option<String>> {
    let (entries, budgets): (i64, i64) = conn.query_row(
        "SELECT (SELECT count(*) FROM entry WHERE category_id = ?1), \
                (SELECT count(*) FROM budget WHERE category_id = ?1)",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    if entries > 0 {
        let noun = if entries == 1 { "entry" } else { "entries" };
        return Ok(Some(format!("Cannot delete: category has {entries} {noun}")));
    }
    if budgets > 0 {
        return Ok(Some(
            "Cannot delete: category has a budget (remove it with `budgets delete`)".to_string(),
        ));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::test_support::test_db;

    #[test]
    fn test_blocking_reason_for_seeded_budget() {
        let (_dir, conn) = test_db();
        let food = CategoryDao::new(&conn).read_by_description("Food").unwrap().unwrap();
        let reason = blocking_reason(&conn, food.id).unwrap().unwrap();
        assert!(reason.contains("budget"));
    }

    #[test]
    fn test_blocking_reason_none_for_unused() {
        let (_dir, conn) = test_db();
        let cat = CategoryDao::new(&conn).create(Category::new("Hobbies").unwrap()).unwrap();
        assert!(blocking_reason(&conn, cat.id).unwrap().is_none());
    }
}
