//! Connectivity check: loads configuration, connects, ensures the schema and pings the
//! store. Exits 0 on success and 1 on any failure.

use dotenvy::dotenv;
use sock_bot::{
    config::{self, database},
    errors::Result,
};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

async fn check() -> Result<()> {
    let app_config = config::load_app_configuration()?;
    info!(
        environment = app_config.environment.name(),
        "Checking database connectivity"
    );

    let db = database::init_database(&app_config.database).await?;
    database::ping_database(&db).await?;
    db.close().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match check().await {
        Ok(()) => {
            info!("Database connection successful");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Database check failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
