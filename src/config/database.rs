//! Database configuration module.
//!
//! This module opens the connection pool and creates all tables using `SeaORM`'s
//! `Schema::create_table_from_entity`, so the schema always matches the entity
//! definitions. The pool is an explicitly constructed handle: it is created once in
//! `main`, handed to the bot context, and closed on shutdown.

use crate::config::settings::DatabaseConfig;
use crate::entities::{CommandUsage, FormLink, Guild, User};
use crate::errors::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Creates the parent directory of a file-backed `SQLite` URL so `mode=rwc` can create it.
fn ensure_sqlite_parent_dir(url: &str) -> Result<()> {
    let Some(rest) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Opens a pooled connection sized from the configuration.
#[instrument(skip(config), fields(connection_limit = config.connection_limit))]
pub async fn create_connection(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    ensure_sqlite_parent_dir(&config.url)?;

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.connection_limit)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .sqlx_logging(false);

    debug!("Connecting to database");
    let db = Database::connect(options).await?;
    info!("Database connection pool ready");
    Ok(db)
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all necessary database tables if they do not exist yet.
///
/// Tables are created in foreign key order: guilds and users before the usage log.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table_for(db, &schema, Guild).await?;
    create_table_for(db, &schema, User).await?;
    create_table_for(db, &schema, CommandUsage).await?;
    create_table_for(db, &schema, FormLink).await?;

    info!("Database tables ensured");
    Ok(())
}

/// Opens the pool and ensures the schema; the single init step used by binaries.
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let db = create_connection(config).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Runs a trivial query to prove the connection works.
pub async fn ping_database(db: &DatabaseConnection) -> Result<()> {
    db.ping().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CommandUsageModel, FormLinkModel, GuildModel, UserModel};
    use sea_orm::QuerySelect;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            connection_limit: 1,
            ..DatabaseConfig::default()
        }
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = init_database(&memory_config()).await?;

        let _: Vec<GuildModel> = Guild::find().limit(1).all(&db).await?;
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<CommandUsageModel> = CommandUsage::find().limit(1).all(&db).await?;
        let _: Vec<FormLinkModel> = FormLink::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = init_database(&memory_config()).await?;
        create_tables(&db).await?;
        ping_database(&db).await?;
        Ok(())
    }

    #[test]
    fn test_memory_url_needs_no_directory() -> Result<()> {
        ensure_sqlite_parent_dir("sqlite::memory:")?;
        ensure_sqlite_parent_dir("mysql://localhost/discord_sock_bot_dev")?;
        Ok(())
    }
}
