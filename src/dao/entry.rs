use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use url::Url;

use super::{in_transaction, GenericDao};
use crate::error::{HomeFinanceError, Result};
use crate::models::{Category, Entry, EntryType};
use crate::validator::AMOUNT_ERROR_MESSAGE;

const DATE_FORMAT: &str = "%Y-%m-%d";

const INSERT_SQL: &str = "INSERT INTO entry (\
     description, type, recurring, amount, comment, url, paid, date, reconciled, category_id\
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

const SELECT_COLUMNS: &str = "SELECT e.id, e.description, e.type, e.recurring, e.amount, e.comment, \
     e.url, e.paid, e.date, e.reconciled, c.id, c.description \
     FROM entry e LEFT JOIN category c ON c.id = e.category_id";

const UPDATE_SQL: &str = "UPDATE entry SET \
     description = ?1, recurring = ?2, amount = ?3, comment = ?4, url = ?5, \
     paid = ?6, date = ?7, reconciled = ?8, category_id = ?9 \
     WHERE id = ?10 AND type = ?11";

const DELETE_SQL: &str = "DELETE FROM entry WHERE id = ?1 AND type = ?2";

/// Entry access scoped to one [`EntryType`]. Rows of other types are never
/// returned, changed, or removed through this DAO.
pub struct EntryDao<'c> {
    conn: &'c Connection,
    entry_type: EntryType,
}

fn parse_url(raw: Option<String>) -> Option<Url> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| Url::parse(&s).ok())
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<Entry> {
    let type_tag: String = row.get(2)?;
    let entry_type: EntryType = type_tag
        .parse()
        .map_err(|e: HomeFinanceError| {
            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
        })?;
    let date_text: String = row.get(8)?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

    let category = match (row.get::<_, Option<i64>>(10)?, row.get::<_, Option<String>>(11)?) {
        (Some(id), Some(description)) => Some(Category { id, description }),
        _ => None,
    };

    Ok(Entry::builder(entry_type)
        .id(row.get(0)?)
        .description(row.get::<_, Option<String>>(1)?.unwrap_or_default())
        .recurring(row.get::<_, Option<bool>>(3)?.unwrap_or(false))
        .amount(row.get::<_, Option<f64>>(4)?.unwrap_or(0.0))
        .comment(row.get::<_, Option<String>>(5)?.unwrap_or_default())
        .url(parse_url(row.get(6)?))
        .paid(row.get::<_, Option<bool>>(7)?.unwrap_or(false))
        .date(date)
        .reconciled(row.get::<_, Option<bool>>(9)?.unwrap_or(false))
        .category(category)
        .build())
}

fn check_amount(record: &Entry) -> Result<()> {
    if record.amount < 0.0 || !record.amount.is_finite() {
        return Err(HomeFinanceError::Validation(vec![AMOUNT_ERROR_MESSAGE.into()]));
    }
    Ok(())
}

fn url_text(record: &Entry) -> String {
    record.url.as_ref().map(Url::to_string).unwrap_or_default()
}

fn query_entries(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Vec<Entry>> {
    let mut stmt = conn.prepare(sql)?;
    let mut entries = Vec::new();
    for row in stmt.query_map(params, row_to_entry)? {
        match row {
            Ok(entry) => entries.push(entry),
            Err(e @ rusqlite::Error::FromSqlConversionFailure(..))
            | Err(e @ rusqlite::Error::InvalidColumnType(..)) => {
                tracing::error!(error = %e, "skipping undecodable entry row");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(entries)
}

impl<'c> EntryDao<'c> {
    pub fn new(conn: &'c Connection, entry_type: EntryType) -> Self {
        Self { conn, entry_type }
    }

    pub fn deposits(conn: &'c Connection) -> Self {
        Self::new(conn, EntryType::In)
    }

    pub fn expenses(conn: &'c Connection) -> Self {
        Self::new(conn, EntryType::Out)
    }

    pub fn balances(conn: &'c Connection) -> Self {
        Self::new(conn, EntryType::Balance)
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Every entry regardless of type, decoded by its type column.
    pub fn list_all(conn: &Connection) -> Result<Vec<Entry>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY e.date, e.id");
        query_entries(conn, &sql, rusqlite::params![])
    }

    /// Entries of this DAO's type dated within `from..=to`.
    pub fn list_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Entry>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE e.type = ?1 AND e.date BETWEEN ?2 AND ?3 ORDER BY e.date, e.id"
        );
        let from = from.format(DATE_FORMAT).to_string();
        let to = to.format(DATE_FORMAT).to_string();
        query_entries(self.conn, &sql, rusqlite::params![self.entry_type.tag(), from, to])
    }

    pub fn set_paid(&self, id: i64, paid: bool) -> Result<bool> {
        self.set_flag("paid", id, paid)
    }

    pub fn set_reconciled(&self, id: i64, reconciled: bool) -> Result<bool> {
        self.set_flag("reconciled", id, reconciled)
    }

    fn set_flag(&self, column: &'static str, id: i64, value: bool) -> Result<bool> {
        let sql = format!("UPDATE entry SET {column} = ?1 WHERE id = ?2 AND type = ?3");
        let affected = in_transaction(self.conn, |tx| {
            Ok(tx.execute(&sql, rusqlite::params![value, id, self.entry_type.tag()])?)
        })?;
        Ok(affected == 1)
    }
}

impl GenericDao for EntryDao<'_> {
    type Record = Entry;
    type Key = i64;

    /// Stored with this DAO's type tag, whatever `record.entry_type` says.
    fn create(&self, mut record: Entry) -> Result<Entry> {
        check_amount(&record)?;
        let id = in_transaction(self.conn, |tx| {
            tx.execute(
                INSERT_SQL,
                rusqlite::params![
                    record.description,
                    self.entry_type.tag(),
                    record.recurring,
                    record.amount,
                    record.comment,
                    url_text(&record),
                    record.paid,
                    record.date.format(DATE_FORMAT).to_string(),
                    record.reconciled,
                    record.category_id(),
                ],
            )
            .map_err(|e| {
                tracing::error!(error = %e, "error inserting an entry");
                e
            })?;
            Ok(tx.last_insert_rowid())
        })?;
        record.id = id;
        record.entry_type = self.entry_type;
        tracing::debug!(id, entry_type = %self.entry_type, "entry created");
        Ok(record)
    }

    fn read(&self, key: i64) -> Result<Option<Entry>> {
        let sql = format!("{SELECT_COLUMNS} WHERE e.id = ?1");
        let entry = self.conn.query_row(&sql, [key], row_to_entry).optional()?;
        match entry {
            None => {
                tracing::warn!(id = key, "entry not found");
                Ok(None)
            }
            Some(entry) if entry.entry_type != self.entry_type => {
                tracing::error!(
                    id = key,
                    stored = %entry.entry_type,
                    expected = %self.entry_type,
                    "entry types don't match"
                );
                Ok(None)
            }
            Some(entry) => Ok(Some(entry)),
        }
    }

    fn update(&self, record: &Entry) -> Result<bool> {
        if record.entry_type != self.entry_type {
            tracing::error!(
                id = record.id,
                given = %record.entry_type,
                expected = %self.entry_type,
                "entry types don't match"
            );
            return Ok(false);
        }
        check_amount(record)?;
        let affected = in_transaction(self.conn, |tx| {
            Ok(tx.execute(
                UPDATE_SQL,
                rusqlite::params![
                    record.description,
                    record.recurring,
                    record.amount,
                    record.comment,
                    url_text(record),
                    record.paid,
                    record.date.format(DATE_FORMAT).to_string(),
                    record.reconciled,
                    record.category_id(),
                    record.id,
                    self.entry_type.tag(),
                ],
            )?)
        })?;
        Ok(affected == 1)
    }

    fn delete(&self, key: i64) -> Result<bool> {
        let affected = in_transaction(self.conn, |tx| {
            Ok(tx.execute(DELETE_SQL, rusqlite::params![key, self.entry_type.tag()])?)
        })?;
        Ok(affected == 1)
    }

    fn list(&self) -> Result<Vec<Entry>> {
        let sql = format!("{SELECT_COLUMNS} WHERE e.type = ?1 ORDER BY e.date, e.id");
        query_entries(self.conn, &sql, rusqlite::params![self.entry_type.tag()])
    }
}
