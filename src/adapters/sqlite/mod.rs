//! SQLite datastore.
//!
//! Every write goes through [`SqliteStore::begin`], which opens a
//! `BEGIN IMMEDIATE` transaction. That takes SQLite's single RESERVED
//! lock up front, so two allocating transactions are totally ordered: the
//! second waits in the busy handler (up to the configured lock timeout)
//! until the first commits or rolls back, and only then reads the tail
//! row. Reads outside a transaction see only committed data.

mod schema;

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use tracing::debug;
use uuid::Uuid;

use crate::error::{is_busy, StoreError};
use crate::ident::ExternalId;
use crate::ports::{LastValueProvider, ProviderError, TailRow};

pub use schema::{id_column, IDENTIFIED_TABLES, SCHEMA};

/// A connection to a roster database.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    lock_timeout: Duration,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened and configured.
    pub fn open(path: &Path, lock_timeout: Duration) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
        }
        Self::configure(Connection::open(path)?, lock_timeout)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` cannot allocate the database.
    pub fn open_in_memory(lock_timeout: Duration) -> Result<Self, StoreError> {
        Self::configure(Connection::open_in_memory()?, lock_timeout)
    }

    fn configure(conn: Connection, lock_timeout: Duration) -> Result<Self, StoreError> {
        conn.busy_timeout(lock_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn, lock_timeout })
    }

    /// Creates tables and switches file databases to WAL journaling.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        let mode: String =
            self.conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(journal_mode = %mode, "journal mode set");
        self.conn.execute_batch(SCHEMA).map_err(|e| classify(e, self.lock_timeout))?;
        Ok(())
    }

    /// Borrows the connection for reads of committed data.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// The busy timeout applied to lock waits.
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Starts a write transaction, waiting for the database write lock.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockTimeout`] when another writer holds the
    /// lock past the busy timeout.
    pub fn begin(&mut self) -> Result<SqliteTxn<'_>, StoreError> {
        let lock_timeout = self.lock_timeout;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| classify(e, lock_timeout))?;
        let tag = Uuid::new_v4();
        debug!(%tag, "write transaction started");
        Ok(SqliteTxn { tx, tag, lock_timeout })
    }
}

fn classify(err: rusqlite::Error, timeout: Duration) -> StoreError {
    if is_busy(&err) {
        StoreError::LockTimeout { timeout }
    } else {
        StoreError::Sqlite(err)
    }
}

/// A write transaction holding the database write lock.
///
/// Dropping it without [`SqliteTxn::commit`] rolls back.
#[derive(Debug)]
pub struct SqliteTxn<'c> {
    tx: Transaction<'c>,
    tag: Uuid,
    lock_timeout: Duration,
}

impl SqliteTxn<'_> {
    /// Connection scoped to this transaction.
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.tx
    }

    /// Random tag identifying this transaction in logs.
    #[must_use]
    pub fn tag(&self) -> Uuid {
        self.tag
    }

    /// Commits and releases the write lock.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` rejects the commit; the transaction is
    /// rolled back in that case.
    pub fn commit(self) -> Result<(), StoreError> {
        let (tag, timeout) = (self.tag, self.lock_timeout);
        self.tx.commit().map_err(|e| classify(e, timeout))?;
        debug!(%tag, "write transaction committed");
        Ok(())
    }

    /// Rolls back and releases the write lock.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` reports a failure while rolling back.
    pub fn rollback(self) -> Result<(), StoreError> {
        let tag = self.tag;
        self.tx.rollback()?;
        debug!(%tag, "write transaction rolled back");
        Ok(())
    }
}

impl LastValueProvider for SqliteTxn<'_> {
    fn lock_tail(&mut self, table: &str) -> Result<Option<TailRow>, ProviderError> {
        let column = id_column(table).ok_or_else(|| {
            ProviderError::Aborted(format!("table `{table}` has no identifier column"))
        })?;
        let sql = format!("SELECT id, {column} FROM {table} ORDER BY id DESC LIMIT 1");

        self.tx
            .query_row(&sql, [], |row| {
                let key: i64 = row.get(0)?;
                let internal_key = u64::try_from(key)
                    .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, key))?;
                let external_id: Option<String> = row.get(1)?;
                Ok(TailRow { internal_key, external_id: external_id.map(ExternalId::from_stored) })
            })
            .optional()
            .map_err(|err| {
                if is_busy(&err) {
                    ProviderError::LockTimeout {
                        table: table.to_string(),
                        timeout: self.lock_timeout,
                    }
                } else {
                    ProviderError::Aborted(err.to_string())
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{IdentifiedRecord, SequentialIdAllocator};
    use crate::records::NewEmployee;
    use rusqlite::params;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory(Duration::from_millis(100)).unwrap();
        store.init_schema().unwrap();
        store
    }

    fn insert_raw(txn: &SqliteTxn<'_>, id: Option<i64>, employee_id: Option<&str>, email: &str) {
        txn.conn()
            .execute(
                "INSERT INTO employees (id, employee_id, email, employment_date)
                 VALUES (?1, ?2, ?3, '2024-01-01')",
                params![id, employee_id, email],
            )
            .unwrap();
    }

    #[test]
    fn empty_table_has_no_tail() {
        let mut store = store();
        let mut txn = store.begin().unwrap();
        assert_eq!(txn.lock_tail("employees").unwrap(), None);
    }

    #[test]
    fn tail_is_the_highest_key() {
        let mut store = store();
        let mut txn = store.begin().unwrap();
        insert_raw(&txn, None, Some("EMP0001"), "a@x.io");
        insert_raw(&txn, None, Some("EMP0002"), "b@x.io");
        let tail = txn.lock_tail("employees").unwrap().unwrap();
        assert_eq!(tail.internal_key, 2);
        assert_eq!(tail.external_id.unwrap().as_str(), "EMP0002");
    }

    #[test]
    fn unknown_table_aborts() {
        let mut store = store();
        let mut txn = store.begin().unwrap();
        assert!(matches!(txn.lock_tail("tasks"), Err(ProviderError::Aborted(_))));
    }

    #[test]
    fn tail_without_identifier_falls_back_to_key() {
        let mut store = store();
        let allocator = SequentialIdAllocator::default();
        {
            let txn = store.begin().unwrap();
            insert_raw(&txn, Some(42), None, "legacy@x.io");
            txn.commit().unwrap();
        }
        let mut txn = store.begin().unwrap();
        let mut draft = NewEmployee::default();
        let id = allocator.allocate(&mut txn, &mut draft).unwrap().into_id();
        assert_eq!(id.as_str(), "EMP0043");
        assert_eq!(draft.external_id(), Some(&id));
    }

    #[test]
    fn rolled_back_rows_are_invisible() {
        let mut store = store();
        {
            let txn = store.begin().unwrap();
            insert_raw(&txn, None, Some("EMP0001"), "a@x.io");
            txn.rollback().unwrap();
        }
        let mut txn = store.begin().unwrap();
        assert_eq!(txn.lock_tail("employees").unwrap(), None);
    }

    #[test]
    fn second_writer_times_out_while_first_holds_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.db");
        let mut first = SqliteStore::open(&path, Duration::from_millis(50)).unwrap();
        first.init_schema().unwrap();
        let mut second = SqliteStore::open(&path, Duration::from_millis(50)).unwrap();

        let held = first.begin().unwrap();
        let err = second.begin().unwrap_err();
        assert!(matches!(err, StoreError::LockTimeout { .. }), "got {err:?}");

        drop(held);
        assert!(second.begin().is_ok());
    }
}
