// Main entry point for the job pipeline server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::common::RetryPolicy;
use server_core::kernel::{ensure_schema, ConnectionProvider, HttpPipelineAgent};
use server_core::server::build_app;
use server_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting job pipeline server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let provider = Arc::new(ConnectionProvider::new(config.database.clone()));
    let retry = RetryPolicy::default();

    // Verify connectivity and heal the schema once up front; write paths
    // repeat the check on every operation.
    let mut conn = provider
        .open_with_retry(&retry)
        .await
        .context("Failed to connect to database")?;
    let created = ensure_schema(&mut conn)
        .await
        .context("Failed to verify database schema")?;
    drop(conn);
    tracing::info!(created, "Database schema verified");

    let agent = Arc::new(
        HttpPipelineAgent::new(config.agent_base_url.clone())
            .context("Failed to create agent client")?,
    );

    let app = build_app(provider, agent, retry);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
