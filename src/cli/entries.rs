use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::Connection;

use super::budgets::find_category;
use super::open_db;
use crate::dao::{in_transaction, BudgetDao, EntryDao, GenericDao};
use crate::error::{HomeFinanceError, Result};
use crate::fmt::{amount, money};
use crate::models::{Entry, EntryType};
use crate::validator::{parse_amount_text, parse_date, parse_url, EntryInput, EntryValidator};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Form fields for a new entry, as typed.
#[derive(Debug, Default)]
pub struct NewEntry {
    pub description: String,
    pub amount: String,
    pub date: Option<String>,
    pub category: Option<String>,
    pub comment: String,
    pub url: String,
    pub recurring: bool,
    pub paid: bool,
}

/// Fields to change on an existing entry. `None` leaves a field alone; an
/// empty category or url clears it.
#[derive(Debug, Default)]
pub struct EntryChanges {
    pub description: Option<String>,
    pub amount: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub comment: Option<String>,
    pub url: Option<String>,
    pub recurring: Option<bool>,
    pub paid: Option<bool>,
}

fn validate(date: &str, amount: &str, url: &str) -> Result<()> {
    let input = EntryInput::builder().date(date).amount(amount).url(url).build();
    let errors = EntryValidator::new(&input).validate();
    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(?errors, "entry rejected");
        Err(HomeFinanceError::Validation(errors))
    }
}

fn resolve_category(conn: &Connection, text: &str) -> Result<Option<crate::models::Category>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    find_category(conn, text).map(Some)
}

fn entry_dao(conn: &Connection, entry_type: EntryType) -> EntryDao<'_> {
    match entry_type {
        EntryType::In => EntryDao::deposits(conn),
        EntryType::Out => EntryDao::expenses(conn),
        EntryType::Balance => EntryDao::balances(conn),
    }
}

fn read_entry(dao: &EntryDao, id: i64) -> Result<Entry> {
    dao.read(id)?.ok_or_else(|| {
        HomeFinanceError::NotFound(format!("{} {id}", dao.entry_type().label()))
    })
}

/// Validate and store a new entry. An expense with a category also counts
/// toward that category's stored actual.
pub fn add_entry(conn: &Connection, entry_type: EntryType, fields: NewEntry) -> Result<Entry> {
    let date_text = fields
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive().format(DATE_FORMAT).to_string());
    validate(&date_text, &fields.amount, &fields.url)?;

    let category = match fields.category {
        Some(c) => resolve_category(conn, &c)?,
        None => None,
    };
    let mut builder = Entry::builder(entry_type)
        .description(fields.description.trim())
        .amount(parse_amount_text(&fields.amount))
        .comment(fields.comment)
        .url(parse_url(&fields.url))
        .recurring(fields.recurring)
        .paid(fields.paid)
        .category(category);
    if let Some(date) = parse_date(&date_text) {
        builder = builder.date(date);
    }
    let record = builder.build();

    in_transaction(conn, |tx| {
        let entry = entry_dao(tx, entry_type).create(record)?;
        if let (EntryType::Out, Some(category)) = (entry_type, &entry.category) {
            let budgets = BudgetDao::new(tx);
            let mut budget = budgets.read_or_create_for_category(category)?;
            budget.add_to_actual(entry.amount);
            budgets.update(&budget)?;
        }
        Ok(entry)
    })
}

pub fn update_entry(conn: &Connection, entry_type: EntryType, id: i64, changes: EntryChanges) -> Result<Entry> {
    let dao = entry_dao(conn, entry_type);
    let mut entry = read_entry(&dao, id)?;

    let date_text = changes
        .date
        .unwrap_or_else(|| entry.date.format(DATE_FORMAT).to_string());
    let amount_text = changes.amount.unwrap_or_else(|| entry.amount.to_string());
    let url_text = changes
        .url
        .unwrap_or_else(|| entry.url.as_ref().map(|u| u.to_string()).unwrap_or_default());
    validate(&date_text, &amount_text, &url_text)?;

    if let Some(date) = parse_date(&date_text) {
        entry.date = date;
    }
    entry.amount = parse_amount_text(&amount_text);
    entry.url = parse_url(&url_text);
    if let Some(description) = changes.description {
        entry.description = description.trim().to_string();
    }
    if let Some(category) = changes.category {
        entry.category = resolve_category(conn, &category)?;
    }
    if let Some(comment) = changes.comment {
        entry.comment = comment;
    }
    if let Some(recurring) = changes.recurring {
        entry.recurring = recurring;
    }
    if let Some(paid) = changes.paid {
        entry.paid = paid;
    }

    if !dao.update(&entry)? {
        return Err(HomeFinanceError::NotFound(format!("{} {id}", entry_type.label())));
    }
    Ok(entry)
}

fn flag(value: bool) -> &'static str {
    if value { "yes" } else { "" }
}

fn entries_table(entries: &[Entry], with_type: bool) -> Table {
    let mut table = Table::new();
    let mut header = vec!["ID", "Date"];
    if with_type {
        header.push("Type");
    }
    header.extend(["Description", "Category", "Amount", "Paid", "Rec.", "Recurring"]);
    table.set_header(header);

    for e in entries {
        let amt = match e.entry_type {
            EntryType::Out => amount(e.amount).red().to_string(),
            EntryType::In => amount(e.amount).green().to_string(),
            EntryType::Balance => amount(e.amount),
        };
        let mut row = vec![Cell::new(e.id), Cell::new(e.date.format(DATE_FORMAT))];
        if with_type {
            row.push(Cell::new(e.entry_type.label()));
        }
        row.extend([
            Cell::new(&e.description),
            Cell::new(e.category_description()),
            Cell::new(amt),
            Cell::new(flag(e.paid)),
            Cell::new(flag(e.reconciled)),
            Cell::new(flag(e.recurring)),
        ]);
        table.add_row(row);
    }
    table
}

pub fn list(entry_type: EntryType, from: Option<String>, to: Option<String>) -> Result<()> {
    let conn = open_db()?;
    let dao = entry_dao(&conn, entry_type);
    let entries = match (from, to) {
        (Some(from), Some(to)) => {
            let bad = |d: &str| HomeFinanceError::Validation(vec![format!("Invalid date: {d}")]);
            let from_date = parse_date(&from).ok_or_else(|| bad(&from))?;
            let to_date = parse_date(&to).ok_or_else(|| bad(&to))?;
            dao.list_between(from_date, to_date)?
        }
        _ => dao.list()?,
    };

    if entries.is_empty() {
        println!("No {} entries.", entry_type.label().to_lowercase());
        return Ok(());
    }
    let total: f64 = entries.iter().map(|e| e.amount).sum();
    println!("{}\n{}", entry_type.label(), entries_table(&entries, false));
    println!("{} entries, total {}", entries.len(), money(total));
    Ok(())
}

pub fn all() -> Result<()> {
    let conn = open_db()?;
    let entries = EntryDao::list_all(&conn)?;
    if entries.is_empty() {
        println!("No entries.");
        return Ok(());
    }
    let net: f64 = entries.iter().map(|e| e.signed_amount()).sum();
    println!("Entries\n{}", entries_table(&entries, true));
    println!("Net: {}", money(net));
    Ok(())
}

pub fn add(entry_type: EntryType, fields: NewEntry) -> Result<()> {
    let conn = open_db()?;
    let entry = add_entry(&conn, entry_type, fields)?;
    println!(
        "Added {} {}: {} {}",
        entry_type.label().to_lowercase(),
        entry.id,
        entry.description,
        money(entry.amount)
    );
    Ok(())
}

pub fn show(entry_type: EntryType, id: i64) -> Result<()> {
    let conn = open_db()?;
    let e = read_entry(&entry_dao(&conn, entry_type), id)?;

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    let url = e.url.as_ref().map(|u| u.to_string()).unwrap_or_default();
    for (field, value) in [
        ("ID", e.id.to_string()),
        ("Type", e.entry_type.label().to_string()),
        ("Date", e.date.format(DATE_FORMAT).to_string()),
        ("Description", e.description.clone()),
        ("Category", e.category_description().to_string()),
        ("Amount", money(e.amount)),
        ("Paid", flag(e.paid).to_string()),
        ("Reconciled", flag(e.reconciled).to_string()),
        ("Recurring", flag(e.recurring).to_string()),
        ("Comment", e.comment.clone()),
        ("URL", url),
    ] {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    println!("{table}");
    Ok(())
}

pub fn update(entry_type: EntryType, id: i64, changes: EntryChanges) -> Result<()> {
    let conn = open_db()?;
    let entry = update_entry(&conn, entry_type, id, changes)?;
    println!("Updated {} {}", entry_type.label().to_lowercase(), entry.id);
    Ok(())
}

pub fn delete(entry_type: EntryType, id: i64) -> Result<()> {
    let conn = open_db()?;
    if !entry_dao(&conn, entry_type).delete(id)? {
        return Err(HomeFinanceError::NotFound(format!("{} {id}", entry_type.label())));
    }
    println!("Deleted {} {id}", entry_type.label().to_lowercase());
    Ok(())
}

pub fn pay(entry_type: EntryType, id: i64, undo: bool) -> Result<()> {
    let conn = open_db()?;
    if !entry_dao(&conn, entry_type).set_paid(id, !undo)? {
        return Err(HomeFinanceError::NotFound(format!("{} {id}", entry_type.label())));
    }
    let state = if undo { "unpaid".yellow() } else { "paid".green() };
    println!("Marked {} {id} {state}", entry_type.label().to_lowercase());
    Ok(())
}

pub fn reconcile(entry_type: EntryType, id: i64, undo: bool) -> Result<()> {
    let conn = open_db()?;
    if !entry_dao(&conn, entry_type).set_reconciled(id, !undo)? {
        return Err(HomeFinanceError::NotFound(format!("{} {id}", entry_type.label())));
    }
    let state = if undo { "unreconciled".yellow() } else { "reconciled".green() };
    println!("Marked {} {id} {state}", entry_type.label().to_lowercase());
    Ok(())
}
