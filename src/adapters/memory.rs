//! In-memory transactional store implementing the tail-lock contract.
//!
//! Each table has an exclusive lock taken by `lock_tail` or `insert` and
//! held until the transaction commits, rolls back, or is dropped. Waiters
//! block on a condition variable up to the store's lock timeout. Inserts
//! are staged per transaction and only become visible on commit.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::ident::ExternalId;
use crate::ports::{LastValueProvider, ProviderError, TailRow};

/// A committed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRow {
    /// Surrogate key; strictly increasing per table and never reused.
    pub internal_key: u64,
    /// External identifier, if assigned.
    pub external_id: Option<ExternalId>,
}

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<String, Vec<MemoryRow>>,
    next_key: HashMap<String, u64>,
    /// Highest-keyed deleted row per table. It stays a tail candidate so a
    /// deleted tail's identifier is never derived again.
    retired: HashMap<String, MemoryRow>,
}

impl Tables {
    fn tail(&self, table: &str) -> Option<&MemoryRow> {
        let live = self.rows.get(table).and_then(|rows| rows.last());
        match (live, self.retired.get(table)) {
            (Some(live), Some(retired)) if retired.internal_key > live.internal_key => {
                Some(retired)
            }
            (live, retired) => live.or(retired),
        }
    }

    fn next_key(&self, table: &str) -> u64 {
        self.next_key.get(table).copied().unwrap_or(1)
    }
}

#[derive(Debug)]
struct Shared {
    tables: Mutex<Tables>,
    locks: Mutex<HashSet<String>>,
    released: Condvar,
    lock_timeout: Duration,
}

impl Shared {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, ProviderError> {
        self.tables.lock().map_err(|e| ProviderError::Aborted(format!("table state poisoned: {e}")))
    }
}

/// Shared handle to an in-memory datastore. Clones refer to the same data.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    /// Creates an empty store whose table locks wait up to `lock_timeout`.
    #[must_use]
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                tables: Mutex::new(Tables::default()),
                locks: Mutex::new(HashSet::new()),
                released: Condvar::new(),
                lock_timeout,
            }),
        }
    }

    /// Starts a transaction.
    #[must_use]
    pub fn begin(&self) -> MemoryTxn {
        MemoryTxn {
            shared: Arc::clone(&self.shared),
            held: HashSet::new(),
            staged: Vec::new(),
        }
    }

    /// Returns the committed rows of `table` in key order.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<MemoryRow> {
        let tables = self.shared.tables.lock().unwrap_or_else(PoisonError::into_inner);
        tables.rows.get(table).cloned().unwrap_or_default()
    }

    /// Inserts a committed row with an explicit key, bypassing allocation.
    ///
    /// Models rows that arrived through migrations or manual edits. The
    /// key counter moves past `internal_key` so later inserts stay
    /// increasing.
    pub fn seed(&self, table: &str, internal_key: u64, external_id: Option<&str>) {
        let mut tables = self.shared.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let next = tables.next_key(table).max(internal_key + 1);
        tables.next_key.insert(table.to_string(), next);
        let rows = tables.rows.entry(table.to_string()).or_default();
        rows.push(MemoryRow {
            internal_key,
            external_id: external_id.map(ExternalId::from_stored),
        });
        rows.sort_by_key(|row| row.internal_key);
    }

    /// Deletes a committed row. Its key and identifier are not recycled.
    pub fn delete(&self, table: &str, internal_key: u64) -> bool {
        let mut tables = self.shared.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(rows) = tables.rows.get_mut(table) else {
            return false;
        };
        let Some(pos) = rows.iter().position(|row| row.internal_key == internal_key) else {
            return false;
        };
        let removed = rows.remove(pos);
        let newer = !tables.retired.get(table).is_some_and(|r| r.internal_key >= internal_key);
        if newer {
            tables.retired.insert(table.to_string(), removed);
        }
        true
    }
}

/// A transaction against a [`MemoryStore`].
///
/// Dropping without [`MemoryTxn::commit`] rolls back.
#[derive(Debug)]
pub struct MemoryTxn {
    shared: Arc<Shared>,
    held: HashSet<String>,
    staged: Vec<(String, MemoryRow)>,
}

impl MemoryTxn {
    /// Stages a row for `table`, taking the table lock if not yet held.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::LockTimeout`] if another transaction holds
    /// the table lock past the deadline.
    pub fn insert(
        &mut self,
        table: &str,
        external_id: Option<ExternalId>,
    ) -> Result<u64, ProviderError> {
        self.acquire(table)?;
        let internal_key = match self.staged_tail(table) {
            Some(row) => row.internal_key + 1,
            None => self.shared.tables()?.next_key(table),
        };
        self.staged.push((table.to_string(), MemoryRow { internal_key, external_id }));
        Ok(internal_key)
    }

    /// Publishes staged rows and releases every lock.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Aborted`] if the shared state is poisoned;
    /// nothing is published in that case.
    pub fn commit(mut self) -> Result<(), ProviderError> {
        let mut tables = self.shared.tables()?;
        for (table, row) in self.staged.drain(..) {
            tables.next_key.insert(table.clone(), row.internal_key + 1);
            tables.rows.entry(table).or_default().push(row);
        }
        Ok(())
    }

    /// Discards staged rows and releases every lock.
    pub fn rollback(mut self) {
        self.staged.clear();
    }

    fn staged_tail(&self, table: &str) -> Option<&MemoryRow> {
        self.staged.iter().rev().find(|(t, _)| t == table).map(|(_, row)| row)
    }

    fn acquire(&mut self, table: &str) -> Result<(), ProviderError> {
        if self.held.contains(table) {
            return Ok(());
        }
        let timeout = self.shared.lock_timeout;

        let guard = self
            .shared
            .locks
            .lock()
            .map_err(|e| ProviderError::Aborted(format!("lock table poisoned: {e}")))?;
        let (mut held, wait) = self
            .shared
            .released
            .wait_timeout_while(guard, timeout, |held| held.contains(table))
            .map_err(|e| ProviderError::Aborted(format!("lock table poisoned: {e}")))?;
        if wait.timed_out() {
            return Err(ProviderError::LockTimeout { table: table.to_string(), timeout });
        }
        held.insert(table.to_string());
        drop(held);

        self.held.insert(table.to_string());
        Ok(())
    }
}

impl LastValueProvider for MemoryTxn {
    fn lock_tail(&mut self, table: &str) -> Result<Option<TailRow>, ProviderError> {
        self.acquire(table)?;
        let row = match self.staged_tail(table) {
            Some(row) => Some(row.clone()),
            None => self.shared.tables()?.tail(table).cloned(),
        };
        Ok(row.map(|row| TailRow { internal_key: row.internal_key, external_id: row.external_id }))
    }
}

impl Drop for MemoryTxn {
    fn drop(&mut self) {
        if self.held.is_empty() {
            return;
        }
        let mut locks = self.shared.locks.lock().unwrap_or_else(PoisonError::into_inner);
        for table in self.held.drain() {
            locks.remove(&table);
        }
        drop(locks);
        self.shared.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{IdentifiedRecord, SequentialIdAllocator};

    const TABLE: &str = "badges";

    #[derive(Default)]
    struct Badge {
        id: Option<ExternalId>,
    }

    impl IdentifiedRecord for Badge {
        const TABLE: &'static str = TABLE;

        fn external_id(&self) -> Option<&ExternalId> {
            self.id.as_ref()
        }

        fn assign_external_id(&mut self, id: ExternalId) {
            self.id = Some(id);
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new(Duration::from_millis(200))
    }

    fn register(store: &MemoryStore, allocator: &SequentialIdAllocator) -> String {
        let mut txn = store.begin();
        let mut badge = Badge::default();
        let id = allocator.allocate(&mut txn, &mut badge).unwrap().into_id();
        txn.insert(TABLE, Some(id.clone())).unwrap();
        txn.commit().unwrap();
        id.into_string()
    }

    #[test]
    fn sequential_registrations_are_contiguous() {
        let store = store();
        let allocator = SequentialIdAllocator::default();
        let ids: Vec<String> = (0..3).map(|_| register(&store, &allocator)).collect();
        assert_eq!(ids, ["EMP0001", "EMP0002", "EMP0003"]);
        let keys: Vec<u64> = store.rows(TABLE).iter().map(|r| r.internal_key).collect();
        assert_eq!(keys, [1, 2, 3]);
    }

    #[test]
    fn rollback_reissues_the_same_number() {
        let store = store();
        let allocator = SequentialIdAllocator::default();
        register(&store, &allocator);

        let mut txn = store.begin();
        let mut badge = Badge::default();
        let tentative = allocator.allocate(&mut txn, &mut badge).unwrap().into_id();
        txn.insert(TABLE, Some(tentative.clone())).unwrap();
        txn.rollback();

        assert_eq!(store.rows(TABLE).len(), 1);
        assert_eq!(register(&store, &allocator), tentative.as_str());
    }

    #[test]
    fn dropped_transaction_releases_the_lock() {
        let store = store();
        {
            let mut txn = store.begin();
            txn.lock_tail(TABLE).unwrap();
        }
        let mut txn = store.begin();
        assert!(txn.lock_tail(TABLE).is_ok());
    }

    #[test]
    fn held_lock_times_out_second_transaction() {
        let store = store();
        let mut first = store.begin();
        first.lock_tail(TABLE).unwrap();

        let mut second = store.begin();
        let err = second.lock_tail(TABLE).unwrap_err();
        assert!(matches!(err, ProviderError::LockTimeout { ref table, .. } if table == TABLE));

        drop(first);
        assert!(second.lock_tail(TABLE).is_ok());
    }

    #[test]
    fn locks_are_per_table() {
        let store = store();
        let mut first = store.begin();
        first.lock_tail(TABLE).unwrap();
        let mut second = store.begin();
        assert!(second.lock_tail("other").is_ok());
    }

    #[test]
    fn seeded_tail_without_id_uses_key_fallback() {
        let store = store();
        store.seed(TABLE, 42, None);
        let allocator = SequentialIdAllocator::default();
        assert_eq!(register(&store, &allocator), "EMP0043");
        assert_eq!(store.rows(TABLE).last().unwrap().internal_key, 43);
    }

    #[test]
    fn two_allocations_in_one_transaction_see_each_other() {
        let store = store();
        let allocator = SequentialIdAllocator::default();
        let mut txn = store.begin();
        for _ in 0..2 {
            let mut badge = Badge::default();
            let id = allocator.allocate(&mut txn, &mut badge).unwrap().into_id();
            txn.insert(TABLE, Some(id)).unwrap();
        }
        txn.commit().unwrap();
        let ids: Vec<String> = store
            .rows(TABLE)
            .into_iter()
            .filter_map(|r| r.external_id.map(ExternalId::into_string))
            .collect();
        assert_eq!(ids, ["EMP0001", "EMP0002"]);
    }

    #[test]
    fn deleting_a_middle_row_does_not_recycle() {
        let store = store();
        let allocator = SequentialIdAllocator::default();
        for _ in 0..3 {
            register(&store, &allocator);
        }
        assert!(store.delete(TABLE, 2));
        assert_eq!(register(&store, &allocator), "EMP0004");
    }

    #[test]
    fn deleting_the_tail_row_does_not_recycle() {
        let store = store();
        let allocator = SequentialIdAllocator::default();
        for _ in 0..3 {
            register(&store, &allocator);
        }
        assert!(store.delete(TABLE, 3));
        assert!(!store.delete(TABLE, 3));
        assert_eq!(register(&store, &allocator), "EMP0004");

        assert!(store.delete(TABLE, 4));
        assert!(store.delete(TABLE, 2));
        assert_eq!(register(&store, &allocator), "EMP0005");
        let keys: Vec<u64> = store.rows(TABLE).iter().map(|r| r.internal_key).collect();
        assert_eq!(keys, [1, 5]);
    }
}
