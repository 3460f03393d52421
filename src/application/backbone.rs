//! Backbone - Composition root wiring modules onto shared infrastructure.

use std::sync::Arc;

use tracing::{error, info};

use crate::adapters::postgres::{Database, PostgresMigrationLedger, TransactionCoordinator};
use crate::adapters::InProcessEventBus;
use crate::config::AppConfig;
use crate::domain::foundation::DomainError;
use crate::domain::migration::MigrationReport;
use crate::ports::{QueryExecutor, Subscription};

use super::migration_runner::MigrationRunner;
use super::modules::auth::AuthRoutes;
use super::modules::profiles::ProfileRoutes;
use super::modules::{self, ModuleContext};

/// One process worth of infrastructure: a pool, a bus, a migration runner,
/// and the routing surfaces of every module.
pub struct Backbone {
    database: Arc<Database>,
    bus: Arc<InProcessEventBus>,
    migrations: MigrationRunner,
    subscriptions: Vec<Subscription>,
    pub auth: AuthRoutes,
    pub profiles: ProfileRoutes,
}

impl Backbone {
    /// Connects, builds modules in order (auth, profiles), and applies
    /// pending migrations when `migrations.run_on_startup` is set.
    ///
    /// On failure the pool is closed before the error is returned.
    pub async fn start(config: &AppConfig) -> Result<Self, DomainError> {
        let database = Arc::new(Database::from_config(&config.database));
        database.connect(&config.database.url).await?;

        match Self::assemble(config, Arc::clone(&database)).await {
            Ok(backbone) => Ok(backbone),
            Err(e) => {
                error!(error = %e, "Backbone failed to start");
                database.disconnect().await;
                Err(e)
            }
        }
    }

    async fn assemble(config: &AppConfig, database: Arc<Database>) -> Result<Self, DomainError> {
        let executor: Arc<dyn QueryExecutor> = database.clone();
        let bus = Arc::new(InProcessEventBus::new());
        let ctx = ModuleContext {
            executor: Arc::clone(&executor),
            transactions: TransactionCoordinator::new(Arc::clone(&database)),
            publisher: bus.clone(),
            subscriber: bus.clone(),
        };

        let ledger = Arc::new(PostgresMigrationLedger::new(
            Arc::clone(&executor),
            config.migrations.ledger_table.clone(),
        )?);
        let mut migrations = MigrationRunner::new(ledger, executor);
        let mut subscriptions = Vec::new();

        let auth = modules::auth::build(&ctx, &config.modules.auth)?;
        migrations.register_domain(auth.migrations)?;
        subscriptions.extend(auth.subscriptions);
        info!(module = auth.domain, "Module registered");

        let profiles = modules::profiles::build(&ctx, &config.modules.profiles)?;
        migrations.register_domain(profiles.migrations)?;
        subscriptions.extend(profiles.subscriptions);
        info!(module = profiles.domain, "Module registered");

        let backbone = Self {
            database,
            bus,
            migrations,
            subscriptions,
            auth: auth.routes,
            profiles: profiles.routes,
        };

        if config.migrations.run_on_startup {
            backbone.run_migrations().await?;
        }

        Ok(backbone)
    }

    pub async fn run_migrations(&self) -> Result<MigrationReport, DomainError> {
        self.migrations.run_all().await
    }

    pub fn migrations(&self) -> &MigrationRunner {
        &self.migrations
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.database
    }

    pub fn events(&self) -> &Arc<InProcessEventBus> {
        &self.bus
    }

    /// Drops every module subscription and closes the pool.
    pub async fn shutdown(self) {
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
        self.database.disconnect().await;
        info!("Backbone stopped");
    }
}
