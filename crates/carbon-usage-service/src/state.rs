//! Application state.

use std::sync::Arc;

use carbon_usage_store::SqlStore;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<SqlStore>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<SqlStore>, config: ServiceConfig) -> Self {
        if config.auth_secret.is_none() {
            tracing::warn!("AUTH_SECRET not configured - all authenticated requests will be rejected");
        }

        Self { store, config }
    }
}
