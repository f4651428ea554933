//! Service context bundling configuration, ports, and the allocator.

use crate::adapters::{FixedClock, LiveClock};
use crate::allocator::SequentialIdAllocator;
use crate::config::{ConfigError, RosterConfig};
use crate::ports::clock::Clock;

/// Everything a roster operation needs besides the database connection.
pub struct ServiceContext {
    /// Clock for "today" in date-dependent operations.
    pub clock: Box<dyn Clock>,
    /// Resolved configuration.
    pub config: RosterConfig,
    /// Employee number allocator built from the configured format.
    pub allocator: SequentialIdAllocator,
}

impl ServiceContext {
    /// Creates a context using the system clock, or a pinned clock when the
    /// configuration sets `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured identifier format is invalid.
    pub fn live(config: RosterConfig) -> Result<Self, ConfigError> {
        let clock: Box<dyn Clock> = match config.today {
            Some(day) => Box::new(FixedClock::on(day)),
            None => Box::new(LiveClock),
        };
        Self::with_clock(config, clock)
    }

    /// Creates a context with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured identifier format is invalid.
    pub fn with_clock(config: RosterConfig, clock: Box<dyn Clock>) -> Result<Self, ConfigError> {
        let allocator = SequentialIdAllocator::new(config.id_format()?);
        Ok(Self { clock, config, allocator })
    }
}
