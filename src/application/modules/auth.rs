//! Auth module wiring.

use std::sync::Arc;

use crate::adapters::postgres::PostgresUserRepository;
use crate::application::handlers::{DeleteUserHandler, RegisterUserHandler};
use crate::config::AuthModuleConfig;
use crate::domain::foundation::DomainError;
use crate::domain::migration::{DomainMigrations, Migration};
use crate::ports::UserRepository;

use super::{ModuleContext, ModuleParts};

pub const DOMAIN: &str = "auth";

/// Handlers exposed by the auth module.
#[derive(Clone)]
pub struct AuthRoutes {
    pub register_user: Arc<RegisterUserHandler>,
    pub delete_user: Arc<DeleteUserHandler>,
}

pub fn build(ctx: &ModuleContext, config: &AuthModuleConfig) -> Result<ModuleParts<AuthRoutes>, DomainError> {
    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(config.schema.clone())?);

    let routes = AuthRoutes {
        register_user: Arc::new(RegisterUserHandler::new(
            ctx.transactions.clone(),
            Arc::clone(&users),
            Arc::clone(&ctx.publisher),
        )),
        delete_user: Arc::new(DeleteUserHandler::new(
            ctx.transactions.clone(),
            users,
            Arc::clone(&ctx.publisher),
        )),
    };

    Ok(ModuleParts {
        domain: DOMAIN,
        routes,
        migrations: migrations(&config.schema)?,
        subscriptions: Vec::new(),
    })
}

/// Auth schema, in apply order.
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
            "001_create_users",
            [format!(
                r#"
                CREATE TABLE IF NOT EXISTS {}.users (
                    id UUID PRIMARY KEY,
                    email TEXT NOT NULL,
                    display_name TEXT NOT NULL,
                    registered_at TIMESTAMPTZ NOT NULL,
                    CONSTRAINT users_email_key UNIQUE (email)
                )
                "#,
                schema
            )],
        )?
        .with_down([format!("DROP TABLE IF EXISTS {}.users", schema)]),
    ];

    Ok(DomainMigrations::new(DOMAIN, migrations))
}
