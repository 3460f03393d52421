//! Module composition.
//!
//! Each module exposes a `build` function taking the shared
//! [`ModuleContext`] and its own config section, and returns
//! [`ModuleParts`]: its migrations for the registry, the subscriptions it
//! made on the bus, and its routing surface (the handlers an outer layer
//! would mount).

pub mod auth;
pub mod profiles;

use std::sync::Arc;

use crate::adapters::postgres::TransactionCoordinator;
use crate::domain::migration::DomainMigrations;
use crate::ports::{EventPublisher, EventSubscriber, QueryExecutor, Subscription};

/// Shared infrastructure handed to every module.
#[derive(Clone)]
pub struct ModuleContext {
    pub executor: Arc<dyn QueryExecutor>,
    pub transactions: TransactionCoordinator,
    pub publisher: Arc<dyn EventPublisher>,
    pub subscriber: Arc<dyn EventSubscriber>,
}

/// What a module contributes to the process.
pub struct ModuleParts<R> {
    pub domain: &'static str,
    pub routes: R,
    pub migrations: DomainMigrations,
    pub subscriptions: Vec<Subscription>,
}
