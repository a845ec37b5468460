//! CareBridge server
//!
//! Serves program enrollments as FHIR `EpisodeOfCare` resources.

use std::sync::Arc;

use anyhow::Context;
use carebridge_persistence::backends::sqlite::SqliteBackend;
use carebridge_rest::{ServerConfig, create_app_with_config, init_logging};
use clap::Parser;
use tracing::{info, warn};

/// Opens the record store named by the configuration and creates its schema.
fn create_sqlite_backend(config: &ServerConfig) -> anyhow::Result<SqliteBackend> {
    let backend = match config.database_path.as_deref() {
        Some(path) => {
            info!(database = %path, "Initializing SQLite backend");
            SqliteBackend::with_config(path, config.backend_config())
                .with_context(|| format!("Failed to open database {path}"))?
        }
        None => {
            warn!("No database path configured; records will not outlive the process");
            SqliteBackend::with_config(":memory:", config.backend_config())
                .context("Failed to open in-memory database")?
        }
    };
    backend
        .init_schema()
        .context("Failed to initialize database schema")?;
    Ok(backend)
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(address = %addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        anyhow::bail!("invalid configuration ({} errors)", errors.len());
    }

    info!(
        port = config.port,
        host = %config.host,
        base_url = %config.base_url,
        "Starting CareBridge server"
    );

    let backend = create_sqlite_backend(&config)?;
    let app = create_app_with_config(Arc::new(backend), config.clone());
    serve(app, &config).await
}
