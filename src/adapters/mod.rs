//! Adapters implementing the port traits.
//!
//! - `clock`: system clock and a pinned-date clock.
//! - `memory`: in-process transactional fake of the tail-lock contract.
//! - `sqlite`: the SQLite-backed datastore used by the application.

pub mod clock;
pub mod memory;
pub mod sqlite;

pub use clock::{FixedClock, LiveClock};
pub use memory::{MemoryRow, MemoryStore, MemoryTxn};
pub use sqlite::{SqliteStore, SqliteTxn};
