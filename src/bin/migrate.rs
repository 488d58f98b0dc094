//! Apply pending schema migrations and exit.
//!
//! Usage:
//!   cargo run --bin migrate

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::info;

use crud_service::config::AppConfig;
use crud_service::infra::PostgresClient;
use crud_service::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config.log, config.server.mode);

    let options = config
        .database
        .connect_options()
        .context("Invalid database settings")?;
    let client = PostgresClient::new(options, config.database.pool_config())
        .await
        .context("Failed to connect to PostgreSQL")?;

    client
        .run_migrations()
        .await
        .context("Migration failed")?;

    client.pool().close().await;
    info!("Schema is up to date");
    Ok(())
}
