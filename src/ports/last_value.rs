//! Tail-row port: fetch and lock the most recently inserted record of a table.

use std::time::Duration;

use thiserror::Error;

use crate::ident::ExternalId;

/// The record holding the maximum internal key in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailRow {
    /// Datastore-assigned surrogate key.
    pub internal_key: u64,
    /// The external identifier, if the row has one.
    pub external_id: Option<ExternalId>,
}

/// Failures while acquiring the tail lock.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Another transaction held the lock for longer than the deadline.
    #[error("timed out after {timeout:?} waiting for the allocation lock on `{table}`")]
    LockTimeout {
        /// Table whose tail was requested.
        table: String,
        /// How long the caller waited.
        timeout: Duration,
    },
    /// The enclosing transaction cannot continue.
    #[error("transaction aborted: {0}")]
    Aborted(String),
}

/// Fetch-and-lock access to a table's tail row, scoped to one transaction.
///
/// Implementations must hold the lock until the transaction that produced
/// them commits or rolls back, so that two allocators never observe the
/// same tail. Real datastores and the in-memory fake both live under
/// `src/adapters/`.
pub trait LastValueProvider {
    /// Locks `table` against concurrent allocators and returns its tail row,
    /// or `None` when the table has no rows.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::LockTimeout`] if the lock is not acquired
    /// within the provider's deadline, or [`ProviderError::Aborted`] if the
    /// underlying transaction failed.
    fn lock_tail(&mut self, table: &str) -> Result<Option<TailRow>, ProviderError>;
}
