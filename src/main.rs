mod cli;
mod dao;
mod db;
mod error;
mod fmt;
mod logging;
mod models;
mod reports;
mod settings;
mod validator;

use clap::Parser;

use cli::entries::{EntryChanges, NewEntry};
use cli::{BudgetsCommands, CategoriesCommands, Cli, Commands, EntryCommands, ReportCommands};
use error::Result;
use models::EntryType;

fn run_entry_command(entry_type: EntryType, command: EntryCommands) -> Result<()> {
    match command {
        EntryCommands::List { from, to } => cli::entries::list(entry_type, from, to),
        EntryCommands::Add {
            description,
            amount,
            date,
            category,
            comment,
            url,
            recurring,
            paid,
        } => cli::entries::add(
            entry_type,
            NewEntry {
                description,
                amount,
                date,
                category,
                comment,
                url,
                recurring,
                paid,
            },
        ),
        EntryCommands::Show { id } => cli::entries::show(entry_type, id),
        EntryCommands::Update {
            id,
            description,
            amount,
            date,
            category,
            comment,
            url,
            recurring,
            paid,
        } => cli::entries::update(
            entry_type,
            id,
            EntryChanges {
                description,
                amount,
                date,
                category,
                comment,
                url,
                recurring,
                paid,
            },
        ),
        EntryCommands::Delete { id } => cli::entries::delete(entry_type, id),
        EntryCommands::Pay { id, undo } => cli::entries::pay(entry_type, id, undo),
        EntryCommands::Reconcile { id, undo } => cli::entries::reconcile(entry_type, id, undo),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir, name } => cli::init::run(data_dir, name),
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Add { description } => cli::categories::add(&description),
            CategoriesCommands::Rename { id, description } => cli::categories::rename(id, &description),
            CategoriesCommands::Delete { id } => cli::categories::delete(id),
        },
        Commands::Budgets { command } => match command {
            BudgetsCommands::List => cli::budgets::list(),
            BudgetsCommands::Set { category, amount } => cli::budgets::set(&category, &amount),
            BudgetsCommands::Delete { category } => cli::budgets::delete(&category),
            BudgetsCommands::Refresh => cli::budgets::refresh(),
        },
        Commands::Deposits { command } => run_entry_command(EntryType::In, command),
        Commands::Expenses { command } => run_entry_command(EntryType::Out, command),
        Commands::Balances { command } => run_entry_command(EntryType::Balance, command),
        Commands::Entries => cli::entries::all(),
        Commands::Report { command } => match command {
            ReportCommands::Budget { month, year } => cli::report::budget(month, year),
            ReportCommands::Balance => cli::report::balance(),
        },
        Commands::Status => cli::status::run(),
        Commands::Backup { output } => cli::backup::run(output),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
