//! Adapters - Implementations of port interfaces.
//!
//! - `events` - In-process event bus
//! - `postgres` - Connection pool, transactions, ledger and repositories

pub mod events;
pub mod postgres;

pub use events::InProcessEventBus;
