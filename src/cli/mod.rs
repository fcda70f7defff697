pub mod backup;
pub mod budgets;
pub mod categories;
pub mod entries;
pub mod init;
pub mod report;
pub mod status;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, is_initialized};
use crate::error::{HomeFinanceError, Result};
use crate::settings::get_db_path;

/// Open the configured database, refusing to create a fresh file outside `init`.
pub(crate) fn open_db() -> Result<Connection> {
    let path = get_db_path();
    if !is_initialized(&path) {
        return Err(HomeFinanceError::NotInitialized(path.display().to_string()));
    }
    get_connection(&path)
}

/// Split `YYYY-MM` into its parts.
pub(crate) fn parse_month_opt(month: &Option<String>) -> Result<(Option<i32>, Option<u32>)> {
    let Some(m) = month else {
        return Ok((None, None));
    };
    let invalid = || HomeFinanceError::Other(format!("Invalid month: {m} (expected YYYY-MM)"));
    let (year, month) = m.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((Some(year), Some(month)))
}

#[derive(Parser)]
#[command(name = "homefinance", about = "Home finance: categories, budgets, deposits and expenses.")]
pub struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and create the database with default categories.
    Init {
        /// Path for data (default: ~/Documents/homefinance)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Your name, shown in `status`
        #[arg(long)]
        name: Option<String>,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage budgets.
    Budgets {
        #[command(subcommand)]
        command: BudgetsCommands,
    },
    /// Money coming in.
    Deposits {
        #[command(subcommand)]
        command: EntryCommands,
    },
    /// Money going out.
    Expenses {
        #[command(subcommand)]
        command: EntryCommands,
    },
    /// Balance carried forward.
    Balances {
        #[command(subcommand)]
        command: EntryCommands,
    },
    /// List every entry of every type.
    Entries,
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show current database and summary statistics.
    Status,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/finance-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List all categories.
    List,
    /// Add a category.
    Add {
        /// Category description, e.g. 'Groceries'
        description: String,
    },
    /// Rename a category.
    Rename {
        id: i64,
        description: String,
    },
    /// Delete a category. Fails while budgets or entries still use it.
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum BudgetsCommands {
    /// Budget amounts with stored actuals.
    List,
    /// Set the budgeted amount for a category.
    Set {
        /// Category description
        category: String,
        /// Budgeted amount, e.g. 1,500.00
        amount: String,
    },
    /// Delete the budget for a category.
    Delete {
        /// Category description
        category: String,
    },
    /// Recalculate stored actuals from expense entries.
    Refresh,
}

#[derive(Subcommand)]
pub enum EntryCommands {
    /// List entries, optionally within a date range.
    List {
        /// Start date: YYYY-MM-DD
        #[arg(long = "from", requires = "to")]
        from: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to", requires = "from")]
        to: Option<String>,
    },
    /// Add an entry.
    Add {
        description: String,
        /// Amount, non-negative, e.g. 1,234.56
        #[arg(long)]
        amount: String,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Category description
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "")]
        comment: String,
        /// Link, e.g. where the bill is paid
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long)]
        recurring: bool,
        #[arg(long)]
        paid: bool,
    },
    /// Show one entry.
    Show { id: i64 },
    /// Change fields of an entry.
    Update {
        id: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        date: Option<String>,
        /// Category description; empty string clears it
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        /// Empty string clears it
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        recurring: Option<bool>,
        #[arg(long)]
        paid: Option<bool>,
    },
    /// Delete an entry.
    Delete { id: i64 },
    /// Mark an entry paid (or cleared, for deposits).
    Pay {
        id: i64,
        /// Mark unpaid instead
        #[arg(long)]
        undo: bool,
    },
    /// Mark an entry reconciled against the bank statement.
    Reconcile {
        id: i64,
        /// Mark unreconciled instead
        #[arg(long)]
        undo: bool,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Budget versus actual spending.
    Budget {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// Year filter: YYYY (default: current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Available and projected balance.
    Balance,
}
