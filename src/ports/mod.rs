//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system (time, the transactional datastore). Implementations
//! live in `src/adapters/`.

pub mod clock;
pub mod last_value;

pub use clock::Clock;
pub use last_value::{LastValueProvider, ProviderError, TailRow};
