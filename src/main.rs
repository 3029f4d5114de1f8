use dotenvy::dotenv;
use sock_bot::{
    bot,
    config::{self, database},
    errors::{Error, Result},
};
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();

    // 2. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| eprintln!("Failed to load configuration: {e}"))?;

    // 3. Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.log_level)),
        )
        .init();
    info!(
        environment = app_config.environment.name(),
        "Configuration loaded"
    );

    // 4. Open the pool and ensure the schema
    let db = database::init_database(&app_config.database)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. DISCORD_BOT_TOKEN is read directly before use, not stored in AppConfig
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    let outcome = bot::framework::run_bot(token, Arc::new(app_config), db.clone()).await;

    // 6. Release the pool whether the client stopped cleanly or not
    if let Err(e) = db.close().await {
        error!("Failed to close database: {}", e);
    }
    outcome
}
