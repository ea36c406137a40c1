//! Carbon-usage service - HTTP API for usage tracking.
//!
//! This is the main entry point for the carbon-usage service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carbon_usage_service::{create_router, AppState, ServiceConfig};
use carbon_usage_store::SqlStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,carbon_usage=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting carbon-usage service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        database_url = %config.database_url,
        auth_configured = %config.auth_secret.is_some(),
        page_size = config.page_size,
        "Service configuration loaded"
    );

    // Open the database and bring the schema up to date
    let store = SqlStore::open(&config.database_url).await?;
    store.migrate().await?;
    tracing::info!("Database ready");

    // Build app state
    let state = AppState::new(Arc::new(store), config.clone());

    // Create the router
    let app = create_router(state);

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
