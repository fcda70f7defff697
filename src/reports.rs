use chrono::Datelike;
use rusqlite::Connection;

use crate::dao::in_transaction;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Period filter helper
// ---------------------------------------------------------------------------

/// `LIKE` pattern on the ISO date column for a year or a single month.
/// Defaults to the current year.
fn period_pattern(year: Option<i32>, month: Option<u32>) -> String {
    let year = year.unwrap_or_else(|| chrono::Local::now().year());
    match month {
        Some(m) => format!("{year:04}-{m:02}-%"),
        None => format!("{year:04}-%"),
    }
}

// ---------------------------------------------------------------------------
// Budget vs actual
// ---------------------------------------------------------------------------

pub struct BudgetLine {
    pub budget_id: i64,
    pub category: String,
    pub budgeted: f64,
    pub actual: f64,
    pub remaining: f64,
    /// `None` when nothing was budgeted.
    pub pct_used: Option<f64>,
}

pub struct BudgetReport {
    pub period: String,
    pub lines: Vec<BudgetLine>,
    pub total_budgeted: f64,
    pub total_actual: f64,
    pub total_remaining: f64,
}

/// Planned amount against expense entries for every budget in the period.
pub fn get_budget_report(conn: &Connection, year: Option<i32>, month: Option<u32>) -> Result<BudgetReport> {
    let pattern = period_pattern(year, month);
    let mut stmt = conn.prepare(
        "SELECT b.id, c.description, COALESCE(b.budget_amt, 0), \
         COALESCE((SELECT SUM(e.amount) FROM entry e \
                   WHERE e.category_id = b.category_id AND e.type = 'out' AND e.date LIKE ?1), 0) \
         FROM budget b JOIN category c ON c.id = b.category_id \
         ORDER BY c.description",
    )?;
    let lines = stmt
        .query_map([&pattern], |row| {
            let budgeted: f64 = row.get(2)?;
            let actual: f64 = row.get(3)?;
            Ok(BudgetLine {
                budget_id: row.get(0)?,
                category: row.get(1)?,
                budgeted,
                actual,
                remaining: budgeted - actual,
                pct_used: (budgeted > 0.0).then(|| actual * 100.0 / budgeted),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let total_budgeted: f64 = lines.iter().map(|l| l.budgeted).sum();
    let total_actual: f64 = lines.iter().map(|l| l.actual).sum();

    Ok(BudgetReport {
        period: pattern.trim_end_matches("-%").to_string(),
        lines,
        total_budgeted,
        total_actual,
        total_remaining: total_budgeted - total_actual,
    })
}

/// Recompute every stored `budget.actual_amt` from all expense entries.
/// Returns the number of budgets touched.
pub fn refresh_actuals(conn: &Connection) -> Result<usize> {
    in_transaction(conn, |tx| {
        Ok(tx.execute(
            "UPDATE budget SET actual_amt = COALESCE(\
             (SELECT SUM(e.amount) FROM entry e \
              WHERE e.category_id = budget.category_id AND e.type = 'out'), 0)",
            [],
        )?)
    })
}

// ---------------------------------------------------------------------------
// Available balance
// ---------------------------------------------------------------------------

pub struct BalanceReport {
    pub balance_forward: f64,
    pub paid_in: f64,
    pub paid_out: f64,
    pub pending_in: f64,
    pub pending_out: f64,
    /// Forward balance plus cleared deposits minus paid expenses.
    pub available: f64,
    /// `available` once every pending entry clears.
    pub projected: f64,
}

pub fn get_balance(conn: &Connection) -> Result<BalanceReport> {
    let (balance_forward, paid_in, paid_out, pending_in, pending_out): (f64, f64, f64, f64, f64) =
        conn.query_row(
            "SELECT \
             COALESCE(SUM(CASE WHEN type = 'balance' THEN amount END), 0), \
             COALESCE(SUM(CASE WHEN type = 'in' AND paid = 1 THEN amount END), 0), \
             COALESCE(SUM(CASE WHEN type = 'out' AND paid = 1 THEN amount END), 0), \
             COALESCE(SUM(CASE WHEN type = 'in' AND paid = 0 THEN amount END), 0), \
             COALESCE(SUM(CASE WHEN type = 'out' AND paid = 0 THEN amount END), 0) \
             FROM entry",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )?;

    let available = balance_forward + paid_in - paid_out;
    Ok(BalanceReport {
        balance_forward,
        paid_in,
        paid_out,
        pending_in,
        pending_out,
        available,
        projected: available + pending_in - pending_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::test_support::test_db;
    use crate::dao::{BudgetDao, CategoryDao, EntryDao, GenericDao};
    use crate::models::{Entry, EntryType};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn seed(conn: &Connection) {
        let cats = CategoryDao::new(conn);
        let food = cats.read_by_description("Food").unwrap().unwrap();
        let housing = cats.read_by_description("Housing").unwrap().unwrap();

        let budgets = BudgetDao::new(conn);
        let mut food_budget = budgets.read_by_category(&food).unwrap().unwrap();
        food_budget.set_budget_amount(400.0).unwrap();
        budgets.update(&food_budget).unwrap();
        let mut rent_budget = budgets.read_by_category(&housing).unwrap().unwrap();
        rent_budget.set_budget_amount(1500.0).unwrap();
        budgets.update(&rent_budget).unwrap();

        let expenses = EntryDao::expenses(conn);
        for (d, amt, cat, paid) in [
            ("2024-01-05", 120.0, &food, true),
            ("2024-01-20", 80.0, &food, false),
            ("2024-02-03", 60.0, &food, true),
            ("2024-01-01", 1500.0, &housing, true),
            ("2023-12-01", 1500.0, &housing, true),
        ] {
            expenses
                .create(
                    Entry::builder(EntryType::Out)
                        .amount(amt)
                        .date(date(d))
                        .paid(paid)
                        .category(Some(cat.clone()))
                        .build(),
                )
                .unwrap();
        }
        EntryDao::deposits(conn)
            .create(Entry::builder(EntryType::In).amount(3000.0).date(date("2024-01-02")).paid(true).build())
            .unwrap();
        EntryDao::deposits(conn)
            .create(Entry::builder(EntryType::In).amount(500.0).date(date("2024-01-30")).build())
            .unwrap();
        EntryDao::balances(conn)
            .create(Entry::builder(EntryType::Balance).amount(250.0).date(date("2024-01-01")).build())
            .unwrap();
    }

    fn line<'a>(report: &'a BudgetReport, category: &str) -> &'a BudgetLine {
        report.lines.iter().find(|l| l.category == category).unwrap()
    }

    #[test]
    fn test_budget_report_for_year() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let report = get_budget_report(&conn, Some(2024), None).unwrap();
        assert_eq!(report.period, "2024");
        assert_eq!(report.lines.len(), 7);
        let food = line(&report, "Food");
        assert_eq!(food.actual, 260.0);
        assert_eq!(food.remaining, 140.0);
        assert_eq!(food.pct_used, Some(65.0));
        assert_eq!(line(&report, "Housing").actual, 1500.0);
        assert_eq!(line(&report, "Medical").pct_used, None);
        assert_eq!(report.total_budgeted, 1900.0);
        assert_eq!(report.total_actual, 1760.0);
    }

    #[test]
    fn test_budget_report_for_month() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let report = get_budget_report(&conn, Some(2024), Some(2)).unwrap();
        assert_eq!(report.period, "2024-02");
        assert_eq!(line(&report, "Food").actual, 60.0);
        assert_eq!(line(&report, "Housing").actual, 0.0);
    }

    #[test]
    fn test_refresh_actuals() {
        let (_dir, conn) = test_db();
        seed(&conn);
        assert_eq!(refresh_actuals(&conn).unwrap(), 7);
        let housing = CategoryDao::new(&conn).read_by_description("Housing").unwrap().unwrap();
        let budget = BudgetDao::new(&conn).read_by_category(&housing).unwrap().unwrap();
        assert_eq!(budget.actual_amount, 3000.0);
    }

    #[test]
    fn test_balance() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let bal = get_balance(&conn).unwrap();
        assert_eq!(bal.balance_forward, 250.0);
        assert_eq!(bal.paid_in, 3000.0);
        assert_eq!(bal.paid_out, 120.0 + 60.0 + 1500.0 + 1500.0);
        assert_eq!(bal.pending_in, 500.0);
        assert_eq!(bal.pending_out, 80.0);
        assert_eq!(bal.available, 250.0 + 3000.0 - 3180.0);
        assert_eq!(bal.projected, bal.available + 500.0 - 80.0);
    }

    #[test]
    fn test_balance_empty_db() {
        let (_dir, conn) = test_db();
        let bal = get_balance(&conn).unwrap();
        assert_eq!(bal.available, 0.0);
        assert_eq!(bal.projected, 0.0);
    }
}
