use rusqlite::{Connection, OptionalExtension};

use super::{in_transaction, GenericDao};
use crate::error::{HomeFinanceError, Result};
use crate::models::Category;

const INSERT_SQL: &str = "INSERT INTO category (description) VALUES (?1)";
const SELECT_SQL: &str = "SELECT id, description FROM category WHERE id = ?1";
const SELECT_BY_DESC_SQL: &str = "SELECT id, description FROM category WHERE description = ?1";
const UPDATE_SQL: &str = "UPDATE category SET description = ?1 WHERE id = ?2";
const DELETE_SQL: &str = "DELETE FROM category WHERE id = ?1";
const LIST_SQL: &str = "SELECT id, description FROM category ORDER BY id";

pub struct CategoryDao<'c> {
    conn: &'c Connection,
}

impl<'c> CategoryDao<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn read_by_description(&self, description: &str) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(SELECT_BY_DESC_SQL, [description], row_to_category)
            .optional()?;
        if category.is_none() {
            tracing::warn!(%description, "no category with this description");
        }
        Ok(category)
    }
}

fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        description: row.get(1)?,
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn check_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(HomeFinanceError::InvalidCategory(
            "description must not be empty".into(),
        ));
    }
    Ok(())
}

impl GenericDao for CategoryDao<'_> {
    type Record = Category;
    type Key = i64;

    fn create(&self, mut record: Category) -> Result<Category> {
        check_description(&record.description)?;
        let id = in_transaction(self.conn, |tx| {
            tx.execute(INSERT_SQL, [&record.description])
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        // duplicates are an expected user error
                        tracing::debug!(description = %record.description, "duplicate category");
                        HomeFinanceError::DuplicateCategory(record.description.clone())
                    } else {
                        tracing::error!(error = %e, "error inserting a category");
                        e.into()
                    }
                })?;
            Ok(tx.last_insert_rowid())
        })?;
        record.id = id;
        tracing::debug!(id, description = %record.description, "category created");
        Ok(record)
    }

    fn read(&self, key: i64) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(SELECT_SQL, [key], row_to_category)
            .optional()?;
        if category.is_none() {
            tracing::warn!(id = key, "category not found");
        }
        Ok(category)
    }

    fn update(&self, record: &Category) -> Result<bool> {
        check_description(&record.description)?;
        let affected = in_transaction(self.conn, |tx| {
            tx.execute(UPDATE_SQL, rusqlite::params![record.description, record.id])
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        HomeFinanceError::DuplicateCategory(record.description.clone())
                    } else {
                        e.into()
                    }
                })
        })?;
        Ok(affected == 1)
    }

    fn delete(&self, key: i64) -> Result<bool> {
        let affected = in_transaction(self.conn, |tx| Ok(tx.execute(DELETE_SQL, [key])?))?;
        Ok(affected == 1)
    }

    fn list(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(LIST_SQL)?;
        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::test_support::test_db;
    use crate::dao::BudgetDao;
    use crate::models::Budget;

    #[test]
    fn test_create_assigns_id() {
        let (_dir, conn) = test_db();
        let dao = CategoryDao::new(&conn);
        let created = dao.create(Category::new("Travel").unwrap()).unwrap();
        assert!(created.id > 0);
        let read = dao.read(created.id).unwrap().unwrap();
        assert_eq!(read.description, "Travel");
    }

    #[test]
    fn test_create_duplicate_fails_and_rolls_back() {
        let (_dir, conn) = test_db();
        let dao = CategoryDao::new(&conn);
        let before = dao.list().unwrap().len();
        let err = dao.create(Category::new("Food").unwrap()).unwrap_err();
        assert!(matches!(err, HomeFinanceError::DuplicateCategory(_)));
        assert_eq!(dao.list().unwrap().len(), before);
    }

    #[test]
    fn test_read_missing_is_none() {
        let (_dir, conn) = test_db();
        let dao = CategoryDao::new(&conn);
        assert!(dao.read(9999).unwrap().is_none());
        assert!(dao.read_by_description("Nope").unwrap().is_none());
    }

    #[test]
    fn test_read_by_description() {
        let (_dir, conn) = test_db();
        let dao = CategoryDao::new(&conn);
        let housing = dao.read_by_description("Housing").unwrap().unwrap();
        assert_eq!(dao.read(housing.id).unwrap().unwrap(), housing);
    }

    #[test]
    fn test_update_renames() {
        let (_dir, conn) = test_db();
        let dao = CategoryDao::new(&conn);
        let mut cat = dao.read_by_description("Automotive").unwrap().unwrap();
        cat.description = "Car".into();
        assert!(dao.update(&cat).unwrap());
        assert_eq!(dao.read(cat.id).unwrap().unwrap().description, "Car");
    }

    #[test]
    fn test_update_missing_returns_false() {
        let (_dir, conn) = test_db();
        let dao = CategoryDao::new(&conn);
        let ghost = Category::with_id(4242, "Ghost").unwrap();
        assert!(!dao.update(&ghost).unwrap());
    }

    #[test]
    fn test_update_to_existing_description_fails() {
        let (_dir, conn) = test_db();
        let dao = CategoryDao::new(&conn);
        let mut cat = dao.read_by_description("Food").unwrap().unwrap();
        cat.description = "Housing".into();
        assert!(matches!(
            dao.update(&cat),
            Err(HomeFinanceError::DuplicateCategory(_))
        ));
    }

    #[test]
    fn test_delete_unreferenced() {
        let (_dir, conn) = test_db();
        let dao = CategoryDao::new(&conn);
        let cat = dao.create(Category::new("Gifts").unwrap()).unwrap();
        assert!(dao.delete(cat.id).unwrap());
        assert!(!dao.delete(cat.id).unwrap());
        assert!(dao.read(cat.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_referenced_by_budget_fails() {
        let (_dir, conn) = test_db();
        let dao = CategoryDao::new(&conn);
        let cat = dao.create(Category::new("Pets").unwrap()).unwrap();
        BudgetDao::new(&conn).create(Budget::for_category(cat.clone())).unwrap();
        assert!(dao.delete(cat.id).is_err());
        assert!(dao.read(cat.id).unwrap().is_some());
    }

    #[test]
    fn test_list_in_id_order() {
        let (_dir, conn) = test_db();
        let list = CategoryDao::new(&conn).list().unwrap();
        assert_eq!(list.len(), 7);
        assert_eq!(list[0].description, "Miscellaneous");
        assert!(list.windows(2).all(|w| w[0].id < w[1].id));
    }
}
