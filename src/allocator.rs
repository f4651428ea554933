//! Sequential, collision-free external identifier allocation.
//!
//! The next identifier is derived from the table's tail row, read under an
//! exclusive lock held for the rest of the enclosing transaction:
//!
//! ```text
//! no tail row                      -> 1
//! tail id parses with our prefix   -> suffix + 1
//! tail id missing or unparsable    -> tail internal key + 1
//! ```
//!
//! The lock is the only serialization point. Nothing is cached between
//! calls, so a rolled-back allocation is simply recomputed by the next
//! transaction.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::ident::{ExternalId, IdFormat};
use crate::ports::{LastValueProvider, ProviderError, TailRow};

/// A record that receives a sequential external identifier on first save.
pub trait IdentifiedRecord {
    /// Table holding records of this kind.
    const TABLE: &'static str;

    /// The identifier assigned so far, if any.
    fn external_id(&self) -> Option<&ExternalId>;

    /// Stores a freshly allocated identifier on the record.
    fn assign_external_id(&mut self, id: ExternalId);
}

/// Outcome of a successful [`SequentialIdAllocator::allocate`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// A new identifier was computed and stored on the record.
    Assigned(ExternalId),
    /// The record already carried this identifier; nothing was touched.
    AlreadyAssigned(ExternalId),
}

impl Allocation {
    /// The identifier the record now carries.
    #[must_use]
    pub fn id(&self) -> &ExternalId {
        match self {
            Self::Assigned(id) | Self::AlreadyAssigned(id) => id,
        }
    }

    /// Consumes the outcome, returning the identifier.
    #[must_use]
    pub fn into_id(self) -> ExternalId {
        match self {
            Self::Assigned(id) | Self::AlreadyAssigned(id) => id,
        }
    }
}

/// Allocation failures surfaced to the caller. None are retried here.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The tail lock was not acquired before the deadline.
    #[error("timed out after {timeout:?} waiting for the allocation lock on `{table}`")]
    LockTimeout {
        /// Table being allocated into.
        table: String,
        /// How long the caller waited.
        timeout: Duration,
    },
    /// The enclosing transaction failed for a reason outside the allocator.
    #[error("transaction aborted during allocation: {0}")]
    TransactionAborted(String),
    /// The next numeric value does not fit in a `u64`.
    #[error("identifier sequence for `{table}` is exhausted")]
    SequenceExhausted {
        /// Table being allocated into.
        table: String,
    },
}

impl From<ProviderError> for AllocationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::LockTimeout { table, timeout } => Self::LockTimeout { table, timeout },
            ProviderError::Aborted(reason) => Self::TransactionAborted(reason),
        }
    }
}

/// Computes and assigns the next identifier in a prefixed, zero-padded
/// sequence.
#[derive(Debug, Clone, Default)]
pub struct SequentialIdAllocator {
    format: IdFormat,
}

impl SequentialIdAllocator {
    /// Creates an allocator producing identifiers in `format`.
    #[must_use]
    pub fn new(format: IdFormat) -> Self {
        Self { format }
    }

    /// The format identifiers are produced in.
    #[must_use]
    pub fn format(&self) -> &IdFormat {
        &self.format
    }

    /// Assigns the next identifier to `record` inside the transaction that
    /// `provider` belongs to.
    ///
    /// A record that already has an identifier is returned as
    /// [`Allocation::AlreadyAssigned`] without touching `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::LockTimeout`] or
    /// [`AllocationError::TransactionAborted`] when the tail lock cannot be
    /// taken, and [`AllocationError::SequenceExhausted`] when the next value
    /// would overflow.
    pub fn allocate<P, R>(
        &self,
        provider: &mut P,
        record: &mut R,
    ) -> Result<Allocation, AllocationError>
    where
        P: LastValueProvider + ?Sized,
        R: IdentifiedRecord,
    {
        if let Some(existing) = record.external_id() {
            debug!(table = R::TABLE, id = %existing, "record already has an identifier");
            return Ok(Allocation::AlreadyAssigned(existing.clone()));
        }

        let tail = provider.lock_tail(R::TABLE)?;
        let value = self.next_value(R::TABLE, tail.as_ref())?;
        let id = self.format.format(value);
        debug!(table = R::TABLE, id = %id, "allocated identifier");

        record.assign_external_id(id.clone());
        Ok(Allocation::Assigned(id))
    }

    /// Derives the next numeric value from the locked tail row.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::SequenceExhausted`] if the increment
    /// overflows.
    pub fn next_value(&self, table: &str, tail: Option<&TailRow>) -> Result<u64, AllocationError> {
        let Some(tail) = tail else {
            return Ok(1);
        };

        let base = match tail.external_id.as_ref().map(|id| self.format.parse_suffix(id.as_str()))
        {
            Some(Ok(suffix)) => suffix,
            Some(Err(err)) => {
                warn!(
                    table,
                    internal_key = tail.internal_key,
                    error = %err,
                    "tail identifier is malformed, deriving from internal key"
                );
                tail.internal_key
            }
            None => {
                warn!(
                    table,
                    internal_key = tail.internal_key,
                    "tail row has no identifier, deriving from internal key"
                );
                tail.internal_key
            }
        };

        base.checked_add(1).ok_or_else(|| AllocationError::SequenceExhausted {
            table: table.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Badge {
        id: Option<ExternalId>,
    }

    impl IdentifiedRecord for Badge {
        const TABLE: &'static str = "badges";

        fn external_id(&self) -> Option<&ExternalId> {
            self.id.as_ref()
        }

        fn assign_external_id(&mut self, id: ExternalId) {
            self.id = Some(id);
        }
    }

    /// Serves a fixed tail and counts lock requests.
    struct FixedTail {
        tail: Option<TailRow>,
        calls: usize,
    }

    impl FixedTail {
        fn new(tail: Option<TailRow>) -> Self {
            Self { tail, calls: 0 }
        }
    }

    impl LastValueProvider for FixedTail {
        fn lock_tail(&mut self, table: &str) -> Result<Option<TailRow>, ProviderError> {
            assert_eq!(table, "badges");
            self.calls += 1;
            Ok(self.tail.clone())
        }
    }

    struct TimesOut;

    impl LastValueProvider for TimesOut {
        fn lock_tail(&mut self, table: &str) -> Result<Option<TailRow>, ProviderError> {
            Err(ProviderError::LockTimeout {
                table: table.to_string(),
                timeout: Duration::from_millis(10),
            })
        }
    }

    fn tail(key: u64, id: Option<&str>) -> Option<TailRow> {
        Some(TailRow { internal_key: key, external_id: id.map(ExternalId::from_stored) })
    }

    fn allocate_with(tail: Option<TailRow>) -> ExternalId {
        let allocator = SequentialIdAllocator::default();
        let mut provider = FixedTail::new(tail);
        let mut badge = Badge { id: None };
        let outcome = allocator.allocate(&mut provider, &mut badge).unwrap();
        assert_eq!(badge.id.as_ref(), Some(outcome.id()));
        outcome.into_id()
    }

    #[test]
    fn empty_table_starts_at_one() {
        assert_eq!(allocate_with(None).as_str(), "EMP0001");
    }

    #[test]
    fn increments_the_tail_suffix() {
        assert_eq!(allocate_with(tail(99, Some("EMP0099"))).as_str(), "EMP0100");
    }

    #[test]
    fn suffix_wins_over_internal_key() {
        assert_eq!(allocate_with(tail(7, Some("EMP0030"))).as_str(), "EMP0031");
    }

    #[test]
    fn missing_tail_id_falls_back_to_internal_key() {
        assert_eq!(allocate_with(tail(42, None)).as_str(), "EMP0043");
    }

    #[test]
    fn foreign_prefix_falls_back_to_internal_key() {
        assert_eq!(allocate_with(tail(42, Some("STF0100"))).as_str(), "EMP0043");
        assert_eq!(allocate_with(tail(42, Some("EMPxx"))).as_str(), "EMP0043");
    }

    #[test]
    fn grows_past_the_padding_width() {
        assert_eq!(allocate_with(tail(10_000, Some("EMP10000"))).as_str(), "EMP10001");
    }

    #[test]
    fn already_assigned_is_a_no_op() {
        let allocator = SequentialIdAllocator::default();
        let mut provider = FixedTail::new(tail(5, Some("EMP0005")));
        let existing = ExternalId::from_stored("EMP0002");
        let mut badge = Badge { id: Some(existing.clone()) };

        let outcome = allocator.allocate(&mut provider, &mut badge).unwrap();

        assert_eq!(outcome, Allocation::AlreadyAssigned(existing.clone()));
        assert_eq!(badge.id, Some(existing));
        assert_eq!(provider.calls, 0);
    }

    #[test]
    fn lock_timeout_is_surfaced() {
        let allocator = SequentialIdAllocator::default();
        let mut badge = Badge { id: None };
        let err = allocator.allocate(&mut TimesOut, &mut badge).unwrap_err();
        assert!(matches!(err, AllocationError::LockTimeout { ref table, .. } if table == "badges"));
        assert!(badge.id.is_none());
    }

    #[test]
    fn overflow_is_an_error_not_a_wrap() {
        let allocator = SequentialIdAllocator::default();
        let max = format!("EMP{}", u64::MAX);
        let err = allocator.next_value("badges", tail(1, Some(&max)).as_ref()).unwrap_err();
        assert!(matches!(err, AllocationError::SequenceExhausted { .. }));
    }

    #[test]
    fn custom_format_is_respected() {
        let allocator = SequentialIdAllocator::new(IdFormat::new("STF-", 6).unwrap());
        let mut provider = FixedTail::new(tail(3, Some("STF-000003")));
        let mut badge = Badge { id: None };
        let outcome = allocator.allocate(&mut provider, &mut badge).unwrap();
        assert_eq!(outcome.id().as_str(), "STF-000004");
    }
}
