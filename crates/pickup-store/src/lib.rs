pub mod db;
pub mod error;
pub mod migrate;
pub mod paths;
pub mod repo;

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;

pub use rusqlite::Transaction;

/// One SQLite connection. Concurrent callers each open their own `Store`
/// against the same file; writes serialize on the database lock.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = db::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        migrate::run_migrations(&self.conn)
    }

    pub fn schema_version(&self) -> Result<i64> {
        migrate::schema_version(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Starts a `BEGIN IMMEDIATE` transaction. The write lock is held from
    /// the first read, so occupancy checks and the writes that depend on them
    /// cannot interleave with another connection's.
    pub fn write_transaction(&self) -> Result<Transaction<'_>> {
        db::begin_immediate(&self.conn)
    }

    pub fn collections(&self) -> repo::CollectionsRepo<'_> {
        repo::CollectionsRepo::new(&self.conn)
    }

    pub fn residents(&self) -> repo::ResidentsRepo<'_> {
        repo::ResidentsRepo::new(&self.conn)
    }
}

pub(crate) fn in_write_transaction<T, F>(conn: &Connection, op: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T>,
{
    if conn.is_autocommit() {
        let tx = db::begin_immediate(conn)?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    } else {
        op(conn)
    }
}
