use rusqlite::{Connection, OptionalExtension};

use super::{in_transaction, GenericDao};
use crate::error::{HomeFinanceError, Result};
use crate::models::{Budget, Category};

const INSERT_SQL: &str =
    "INSERT INTO budget (category_id, budget_amt, actual_amt) VALUES (?1, ?2, ?3)";

// Left join so a budget pointing at a vanished category is visible (and skipped)
// rather than silently filtered.
const SELECT_COLUMNS: &str = "SELECT b.id, b.budget_amt, b.actual_amt, b.category_id, c.description \
     FROM budget b LEFT JOIN category c ON c.id = b.category_id";

const UPDATE_SQL: &str =
    "UPDATE budget SET category_id = ?1, budget_amt = ?2, actual_amt = ?3 WHERE id = ?4";
const DELETE_SQL: &str = "DELETE FROM budget WHERE id = ?1";

pub struct BudgetDao<'c> {
    conn: &'c Connection,
}

struct BudgetRow {
    id: i64,
    budget_amt: f64,
    actual_amt: f64,
    category_id: i64,
    category_description: Option<String>,
}

impl BudgetRow {
    fn into_budget(self) -> Option<Budget> {
        let Some(description) = self.category_description else {
            tracing::error!(
                budget_id = self.id,
                category_id = self.category_id,
                "budget references a missing category"
            );
            return None;
        };
        let category = Category {
            id: self.category_id,
            description,
        };
        match Budget::new(self.id, category, self.budget_amt, self.actual_amt) {
            Ok(budget) => Some(budget),
            Err(e) => {
                tracing::error!(budget_id = self.id, error = %e, "skipping unreadable budget");
                None
            }
        }
    }
}

fn row_to_budget_row(row: &rusqlite::Row) -> rusqlite::Result<BudgetRow> {
    Ok(BudgetRow {
        id: row.get(0)?,
        budget_amt: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
        actual_amt: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
        category_id: row.get(3)?,
        category_description: row.get(4)?,
    })
}

fn check_amount(record: &Budget) -> Result<()> {
    if record.budget_amount < 0.0 {
        return Err(HomeFinanceError::InvalidBudget(
            "budget amount cannot be negative".into(),
        ));
    }
    Ok(())
}

impl<'c> BudgetDao<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn read_by_category(&self, category: &Category) -> Result<Option<Budget>> {
        let sql = format!("{SELECT_COLUMNS} WHERE b.category_id = ?1 ORDER BY b.id LIMIT 1");
        let row = self
            .conn
            .query_row(&sql, [category.id], row_to_budget_row)
            .optional()?;
        if row.is_none() {
            tracing::info!(category_id = category.id, "no budget for category");
        }
        Ok(row.and_then(BudgetRow::into_budget))
    }

    /// The budget for `category`, creating a zero budget when none exists yet.
    pub fn read_or_create_for_category(&self, category: &Category) -> Result<Budget> {
        match self.read_by_category(category)? {
            Some(budget) => Ok(budget),
            None => self.create(Budget::for_category(category.clone())),
        }
    }
}

impl GenericDao for BudgetDao<'_> {
    type Record = Budget;
    type Key = i64;

    fn create(&self, mut record: Budget) -> Result<Budget> {
        check_amount(&record)?;
        let id = in_transaction(self.conn, |tx| {
            tx.execute(
                INSERT_SQL,
                rusqlite::params![record.category_id(), record.budget_amount, record.actual_amount],
            )
            .map_err(|e| {
                tracing::error!(error = %e, "error inserting a budget");
                e
            })?;
            Ok(tx.last_insert_rowid())
        })?;
        record.id = id;
        tracing::debug!(id, category = %record.category.description, "budget created");
        Ok(record)
    }

    fn read(&self, key: i64) -> Result<Option<Budget>> {
        let sql = format!("{SELECT_COLUMNS} WHERE b.id = ?1");
        let row = self
            .conn
            .query_row(&sql, [key], row_to_budget_row)
            .optional()?;
        if row.is_none() {
            tracing::warn!(id = key, "budget not found");
        }
        Ok(row.and_then(BudgetRow::into_budget))
    }

    fn update(&self, record: &Budget) -> Result<bool> {
        check_amount(record)?;
        let affected = in_transaction(self.conn, |tx| {
            Ok(tx.execute(
                UPDATE_SQL,
                rusqlite::params![
                    record.category_id(),
                    record.budget_amount,
                    record.actual_amount,
                    record.id
                ],
            )?)
        })?;
        Ok(affected == 1)
    }

    fn delete(&self, key: i64) -> Result<bool> {
        let affected = in_transaction(self.conn, |tx| Ok(tx.execute(DELETE_SQL, [key])?))?;
        Ok(affected == 1)
    }

    fn list(&self) -> Result<Vec<Budget>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY b.id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_budget_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().filter_map(BudgetRow::into_budget).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::test_support::test_db;
    use crate::dao::CategoryDao;

    fn category(conn: &Connection, description: &str) -> Category {
        CategoryDao::new(conn)
            .read_by_description(description)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_list_joins_categories() {
        let (_dir, conn) = test_db();
        let budgets = BudgetDao::new(&conn).list().unwrap();
        assert_eq!(budgets.len(), 7);
        assert_eq!(budgets[0].category_description(), "Miscellaneous");
        assert!(budgets.iter().all(|b| b.budget_amount == 0.0));
    }

    #[test]
    fn test_read_by_category() {
        let (_dir, conn) = test_db();
        let food = category(&conn, "Food");
        let budget = BudgetDao::new(&conn).read_by_category(&food).unwrap().unwrap();
        assert_eq!(budget.category, food);
    }

    #[test]
    fn test_update_amount() {
        let (_dir, conn) = test_db();
        let dao = BudgetDao::new(&conn);
        let mut budget = dao.read_by_category(&category(&conn, "Housing")).unwrap().unwrap();
        budget.set_budget_amount(1500.0).unwrap();
        budget.add_to_actual(1200.0);
        assert!(dao.update(&budget).unwrap());
        let stored = dao.read(budget.id).unwrap().unwrap();
        assert_eq!(stored.budget_amount, 1500.0);
        assert_eq!(stored.actual_amount, 1200.0);
    }

    #[test]
    fn test_negative_amount_rejected_before_sql() {
        let (_dir, conn) = test_db();
        let dao = BudgetDao::new(&conn);
        let mut budget = dao.read_by_category(&category(&conn, "Food")).unwrap().unwrap();
        budget.budget_amount = -10.0;
        assert!(matches!(dao.update(&budget), Err(HomeFinanceError::InvalidBudget(_))));
    }

    #[test]
    fn test_create_for_unknown_category_rolls_back() {
        let (_dir, conn) = test_db();
        let dao = BudgetDao::new(&conn);
        let ghost = Category::with_id(777, "Ghost").unwrap();
        assert!(dao.create(Budget::for_category(ghost)).is_err());
        assert_eq!(dao.list().unwrap().len(), 7);
    }

    #[test]
    fn test_read_or_create_for_category() {
        let (_dir, conn) = test_db();
        let cat = CategoryDao::new(&conn)
            .create(Category::new("Gifts").unwrap())
            .unwrap();
        let dao = BudgetDao::new(&conn);
        assert!(dao.read_by_category(&cat).unwrap().is_none());
        let created = dao.read_or_create_for_category(&cat).unwrap();
        assert!(created.id > 0);
        let again = dao.read_or_create_for_category(&cat).unwrap();
        assert_eq!(created.id, again.id);
    }

    #[test]
    fn test_delete() {
        let (_dir, conn) = test_db();
        let dao = BudgetDao::new(&conn);
        let budget = dao.read_by_category(&category(&conn, "Medical")).unwrap().unwrap();
        assert!(dao.delete(budget.id).unwrap());
        assert!(dao.read(budget.id).unwrap().is_none());
        assert!(!dao.delete(budget.id).unwrap());
    }

    #[test]
    fn test_orphaned_budget_is_skipped() {
        let (_dir, conn) = test_db();
        conn.execute_batch(
            "PRAGMA foreign_keys=OFF; \
             INSERT INTO budget (category_id, budget_amt, actual_amt) VALUES (555, 10, 0); \
             PRAGMA foreign_keys=ON;",
        )
        .unwrap();
        let orphan_id = conn.last_insert_rowid();
        let dao = BudgetDao::new(&conn);
        assert_eq!(dao.list().unwrap().len(), 7);
        assert!(dao.read(orphan_id).unwrap().is_none());
    }
}
