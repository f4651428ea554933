//! Clock port for obtaining the current time.

use chrono::{DateTime, NaiveDate, Utc};

/// Provides the current time.
///
/// Abstracting time access lets the time-windowed queries (overdue grace
/// periods, rejection notices, who is on leave) run against a pinned date
/// in tests and from the `ROSTER_TODAY` override.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
