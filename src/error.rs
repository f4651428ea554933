//! Error type for roster store operations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::allocator::AllocationError;
use crate::validate::ValidationError;

/// Failures from the roster store and its SQLite adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another writer held the database lock past the busy timeout.
    #[error("timed out after {timeout:?} waiting for the database write lock")]
    LockTimeout {
        /// Configured busy timeout.
        timeout: Duration,
    },
    /// Identifier allocation failed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    /// A validation rule rejected the change; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The referenced row does not exist.
    #[error("{entity} {key} not found")]
    NotFound {
        /// Kind of row looked up.
        entity: &'static str,
        /// Key as given by the caller.
        key: String,
    },
    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Duplicate(String),
    /// A stored value could not be decoded.
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
    /// Any other database failure.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The database's parent directory could not be created.
    #[error("failed to prepare database directory {path}: {source}")]
    Io {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// True for SQLite's "database is busy/locked" failures.
pub(crate) fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
    )
}

/// True for UNIQUE / PRIMARY KEY constraint violations.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == rusqlite::ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}
