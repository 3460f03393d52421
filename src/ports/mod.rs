//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! ## Database Ports
//!
//! - `QueryExecutor` - Parameterized SQL, pooled or transaction-scoped
//! - `MigrationLedger` - Record of applied migrations
//! - `UserRepository`, `ProfileRepository` - Module persistence
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing events
//! - `EventSubscriber` - Port for subscribing to events
//! - `EventHandler` - Handler that processes incoming events

mod event_publisher;
mod event_subscriber;
mod migration_ledger;
mod profile_repository;
mod query_executor;
mod user_repository;

pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventHandler, EventSubscriber, Subscription};
pub use migration_ledger::MigrationLedger;
pub use profile_repository::ProfileRepository;
pub use query_executor::{QueryExecutor, QueryResult, Row, SqlParam};
pub use user_repository::UserRepository;
