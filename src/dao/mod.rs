//! Data access: one DAO per table, each mapping typed records to hand-written
//! SQL over a borrowed connection.
//!
//! Every write runs in its own transaction. Reads return `Ok(None)` when no
//! row matches; only real database failures surface as errors.

mod budget;
mod category;
mod entry;

pub use budget::BudgetDao;
pub use category::CategoryDao;
pub use entry::EntryDao;

use rusqlite::Connection;

use crate::error::Result;

pub trait GenericDao {
    type Record;
    type Key;

    /// Insert `record` and return it carrying the generated id.
    fn create(&self, record: Self::Record) -> Result<Self::Record>;
    fn read(&self, key: Self::Key) -> Result<Option<Self::Record>>;
    /// `true` when exactly one row was changed.
    fn update(&self, record: &Self::Record) -> Result<bool>;
    /// `true` when exactly one row was removed.
    fn delete(&self, key: Self::Key) -> Result<bool>;
    fn list(&self) -> Result<Vec<Self::Record>>;
}

/// Run `f` inside a transaction on `conn`. Commits when `f` succeeds; the
/// transaction rolls back on drop otherwise. When a transaction is already
/// open, `f` joins it and the outer caller decides commit or rollback.
pub(crate) fn in_transaction<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
    if !conn.is_autocommit() {
        return f(conn);
    }
    let tx = conn.unchecked_transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}
