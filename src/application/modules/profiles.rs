//! Profiles module wiring.

use std::sync::Arc;

use crate::adapters::postgres::PostgresProfileRepository;
use crate::application::handlers::{GetProfileHandler, ProfileProjection, PROFILE_PROJECTION_EVENTS};
use crate::config::ProfilesModuleConfig;
use crate::domain::foundation::DomainError;
use crate::domain::migration::{DomainMigrations, Migration};
use crate::ports::{EventHandler, ProfileRepository};

use super::{ModuleContext, ModuleParts};

pub const DOMAIN: &str = "profiles";

/// Handlers exposed by the profiles module.
#[derive(Clone)]
pub struct ProfileRoutes {
    pub get_profile: Arc<GetProfileHandler>,
}

/// Builds the module and subscribes its projection to auth events.
pub fn build(
    ctx: &ModuleContext,
    config: &ProfilesModuleConfig,
) -> Result<ModuleParts<ProfileRoutes>, DomainError> {
    let profiles: Arc<dyn ProfileRepository> =
        Arc::new(PostgresProfileRepository::new(config.schema.clone())?);
    let migrations = migrations(&config.schema)?;

    let projection: Arc<dyn EventHandler> = Arc::new(ProfileProjection::new(
        Arc::clone(&ctx.executor),
        Arc::clone(&profiles),
    ));
    let subscriptions = ctx.subscriber.subscribe_all(&PROFILE_PROJECTION_EVENTS, projection);

    Ok(ModuleParts {
        domain: DOMAIN,
        routes: ProfileRoutes {
            get_profile: Arc::new(GetProfileHandler::new(Arc::clone(&ctx.executor), profiles)),
        },
        migrations,
        subscriptions,
    })
}

/// Profiles schema, in apply order. No foreign key to auth: modules share a
/// database, not tables.
pub fn migrations(schema: &str) -> Result<DomainMigrations, DomainError> {
    let migrations = vec![
        Migration::new(
            DOMAIN,
            "000_create_schema",
            [format!("CREATE SCHEMA IF NOT EXISTS {}", schema)],
        )?
        .with_down([format!("DROP SCHEMA IF EXISTS {} CASCADE", schema)]),
        Migration::new(
            DOMAIN,
            "001_create_profiles",
            [format!(
                r#"
                CREATE TABLE IF NOT EXISTS {}.profiles (
                    user_id UUID PRIMARY KEY,
                    display_name TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL
                )
                "#,
                schema
            )],
        )?
        .with_down([format!("DROP TABLE IF EXISTS {}.profiles", schema)]),
    ];

    Ok(DomainMigrations::new(DOMAIN, migrations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::postgres::{Database, TransactionCoordinator};
    use crate::adapters::InProcessEventBus;
    use crate::config::DatabaseConfig;
    use crate::domain::auth::{USER_DELETED, USER_REGISTERED};

    #[test]
    fn build_subscribes_projection_to_auth_events() {
        let db = Arc::new(Database::from_config(&DatabaseConfig::default()));
        let bus = Arc::new(InProcessEventBus::new());
        let ctx = ModuleContext {
            executor: db.clone(),
            transactions: TransactionCoordinator::new(db),
            publisher: bus.clone(),
            subscriber: bus.clone(),
        };

        let parts = build(&ctx, &ProfilesModuleConfig::default()).unwrap();

        assert_eq!(parts.subscriptions.len(), 2);
        assert_eq!(bus.subscriber_count(USER_REGISTERED), 1);
        assert_eq!(bus.subscriber_count(USER_DELETED), 1);

        for sub in &parts.subscriptions {
            sub.unsubscribe();
        }
        assert_eq!(bus.subscriber_count(USER_REGISTERED), 0);
    }

    #[test]
    fn rejects_invalid_schema() {
        assert!(migrations("profiles").is_ok());
        let config = ProfilesModuleConfig {
            schema: "bad schema".to_string(),
        };
        let db = Arc::new(Database::from_config(&DatabaseConfig::default()));
        let bus = Arc::new(InProcessEventBus::new());
        let ctx = ModuleContext {
            executor: db.clone(),
            transactions: TransactionCoordinator::new(db),
            publisher: bus.clone(),
            subscriber: bus,
        };

        assert!(build(&ctx, &config).is_err());
    }
}
