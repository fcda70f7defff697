use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{open_db, parse_month_opt};
use crate::error::Result;
use crate::fmt::money;
use crate::reports;

pub fn budget(month: Option<String>, year: Option<i32>) -> Result<()> {
    let conn = open_db()?;
    let (my, mm) = parse_month_opt(&month)?;
    let report = reports::get_budget_report(&conn, year.or(my), mm)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Category", "Budgeted", "Actual", "Remaining", "% Used"]);
    for line in &report.lines {
        let remaining = if line.remaining < 0.0 {
            money(line.remaining).red().to_string()
        } else {
            money(line.remaining)
        };
        let pct = line.pct_used.map(|p| format!("{p:.1}%")).unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(line.budget_id),
            Cell::new(&line.category),
            Cell::new(money(line.budgeted)),
            Cell::new(money(line.actual)),
            Cell::new(remaining),
            Cell::new(pct),
        ]);
    }
    let total_remaining = if report.total_remaining < 0.0 {
        money(report.total_remaining).red().bold()
    } else {
        money(report.total_remaining).green().bold()
    };
    table.add_row(vec![
        Cell::new(""),
        Cell::new("Total".bold()),
        Cell::new(money(report.total_budgeted)),
        Cell::new(money(report.total_actual)),
        Cell::new(total_remaining),
        Cell::new(""),
    ]);

    println!("Budget vs Actual: {}\n{table}", report.period);
    Ok(())
}

pub fn balance() -> Result<()> {
    let conn = open_db()?;
    let bal = reports::get_balance(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["", "Amount"]);
    table.add_row(vec![Cell::new("Balance forward"), Cell::new(money(bal.balance_forward))]);
    table.add_row(vec![Cell::new("Deposits cleared"), Cell::new(money(bal.paid_in))]);
    table.add_row(vec![Cell::new("Expenses paid"), Cell::new(money(-bal.paid_out))]);
    let available = if bal.available < 0.0 {
        money(bal.available).red().bold()
    } else {
        money(bal.available).green().bold()
    };
    table.add_row(vec![Cell::new("Available".bold()), Cell::new(available)]);
    table.add_row(vec![Cell::new(""), Cell::new("")]);
    table.add_row(vec![Cell::new("Deposits pending"), Cell::new(money(bal.pending_in))]);
    table.add_row(vec![Cell::new("Expenses unpaid"), Cell::new(money(-bal.pending_out))]);
    table.add_row(vec![Cell::new("Projected".bold()), Cell::new(money(bal.projected))]);

    println!("Balance\n{table}");
    Ok(())
}
