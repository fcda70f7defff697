use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::Connection;

use super::open_db;
use crate::dao::{BudgetDao, CategoryDao, GenericDao};
use crate::error::{HomeFinanceError, Result};
use crate::fmt::amount;
use crate::models::{Budget, Category};
use crate::reports;
use crate::validator::{parse_amount, AMOUNT_ERROR_MESSAGE};

pub(crate) fn find_category(conn: &Connection, description: &str) -> Result<Category> {
    CategoryDao::new(conn)
        .read_by_description(description)?
        .ok_or_else(|| HomeFinanceError::UnknownCategory(description.to_string()))
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let budgets = BudgetDao::new(&conn).list()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Category", "Budget", "Actual", "Remaining"]);
    for b in &budgets {
        let remaining = amount(b.remaining());
        let remaining = if b.remaining() < 0.0 { remaining.red().to_string() } else { remaining };
        table.add_row(vec![
            Cell::new(b.id),
            Cell::new(b.category_description()),
            Cell::new(amount(b.budget_amount)),
            Cell::new(amount(b.actual_amount)),
            Cell::new(remaining),
        ]);
    }
    println!("Budgets\n{table}");
    Ok(())
}

/// Set the budgeted amount for `category`, creating its budget if needed.
pub fn set_amount(conn: &Connection, category: &str, amount_text: &str) -> Result<Budget> {
    let value = parse_amount(amount_text)
        .filter(|v| *v >= 0.0)
        .ok_or_else(|| HomeFinanceError::Validation(vec![AMOUNT_ERROR_MESSAGE.to_string()]))?;
    let category = find_category(conn, category)?;
    let dao = BudgetDao::new(conn);
    let mut budget = dao.read_or_create_for_category(&category)?;
    budget.set_budget_amount(value)?;
    if !dao.update(&budget)? {
        tracing::warn!(%budget, "could not update budget");
        return Err(HomeFinanceError::NotFound(format!("Budget {}", budget.id)));
    }
    tracing::info!(%budget, amount = value, "budget updated");
    Ok(budget)
}

pub fn set(category: &str, amount_text: &str) -> Result<()> {
    let conn = open_db()?;
    let budget = set_amount(&conn, category, amount_text)?;
    println!(
        "Budget for {} set to {}",
        budget.category_description(),
        amount(budget.budget_amount)
    );
    Ok(())
}

pub fn delete(category: &str) -> Result<()> {
    let conn = open_db()?;
    let category = find_category(&conn, category)?;
    let dao = BudgetDao::new(&conn);
    let budget = dao
        .read_by_category(&category)?
        .ok_or_else(|| HomeFinanceError::NotFound(format!("Budget for {}", category.description)))?;
    if !dao.delete(budget.id)? {
        tracing::warn!(%budget, "delete failed");
        return Err(HomeFinanceError::NotFound(format!("Budget {}", budget.id)));
    }
    println!("Deleted budget for {}", category.description);
    Ok(())
}

pub fn refresh() -> Result<()> {
    let conn = open_db()?;
    let updated = reports::refresh_actuals(&conn)?;
    println!("Recalculated actuals for {updated} budgets");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::test_support::test_db;

    #[test]
    fn test_set_amount_creates_missing_budget() {
        let (_dir, conn) = test_db();
        CategoryDao::new(&conn).create(Category::new("Gifts").unwrap()).unwrap();
        let budget = set_amount(&conn, "Gifts", "1,250.00").unwrap();
        assert!(budget.id > 0);
        assert_eq!(budget.budget_amount, 1250.0);
        let stored = BudgetDao::new(&conn).read(budget.id).unwrap().unwrap();
        assert_eq!(stored.budget_amount, 1250.0);
    }

    #[test]
    fn test_set_amount_rejects_negative() {
        let (_dir, conn) = test_db();
        assert!(matches!(
            set_amount(&conn, "Food", "-20"),
            Err(HomeFinanceError::Validation(_))
        ));
    }

    #[test]
    fn test_set_amount_unknown_category() {
        let (_dir, conn) = test_db();
        assert!(matches!(
            set_amount(&conn, "Yachts", "20"),
            Err(HomeFinanceError::UnknownCategory(_))
        ));
    }
}
