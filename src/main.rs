//! Application entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use crud_service::api::{PipelineTimeouts, create_router};
use crud_service::app::AppState;
use crud_service::config::AppConfig;
use crud_service::infra::PostgresClient;
use crud_service::telemetry::init_tracing;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config.log, config.server.mode);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = config.server.mode.as_str(),
        "Starting CRUD service"
    );

    let connect_options = config
        .database
        .connect_options()
        .context("Invalid database settings")?;
    let postgres = Arc::new(
        PostgresClient::new(connect_options, config.database.pool_config())
            .await
            .context("Failed to connect to PostgreSQL")?,
    );

    let app_state = Arc::new(AppState::with_config(
        Arc::clone(&postgres) as _,
        Arc::clone(&postgres) as _,
        Arc::clone(&postgres) as _,
        config.service,
    ));

    let router = create_router(
        app_state,
        PipelineTimeouts {
            read: config.server.read_timeout,
            write: config.server.write_timeout,
        },
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server starting on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await
    });

    tokio::select! {
        joined = &mut server => {
            joined.context("Server task failed")??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    let _ = shutdown_tx.send(true);
    let grace = config.server.shutdown_grace;
    info!(grace_secs = grace.as_secs(), "Draining in-flight requests");

    match tokio::time::timeout(grace, &mut server).await {
        Ok(joined) => joined.context("Server task failed")??,
        Err(_) => {
            warn!("Grace period elapsed, closing remaining connections");
            server.abort();
        }
    }

    postgres.pool().close().await;
    info!("Server shutdown complete");
    Ok(())
}
