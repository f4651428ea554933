//! Clock adapters: the system clock and a pinned date.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::ports::clock::Clock;

/// Live clock that returns the real current time.
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to midnight UTC of a fixed date.
///
/// Used when `ROSTER_TODAY` is set and by tests of the time-windowed
/// queries.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    /// Pins the clock to the start of `day`.
    #[must_use]
    pub fn on(day: NaiveDate) -> Self {
        Self { at: day.and_time(NaiveTime::MIN).and_utc() }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}
