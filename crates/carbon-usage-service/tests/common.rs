//! Common test utilities for carbon-usage integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use carbon_usage_service::{create_router, AppState, ServiceConfig};
use carbon_usage_store::SqlStore;

/// Shared secret the test server validates tokens against.
const TEST_SECRET: &str = "test-secret";

#[derive(Serialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct handle on the backing store, for fixtures.
    pub store: Arc<SqlStore>,
}

impl TestHarness {
    /// Create a new test harness with a fresh, migrated database.
    pub async fn new() -> Self {
        Self::with_page_size(50).await
    }

    /// Create a harness with a custom list page size.
    pub async fn with_page_size(page_size: u32) -> Self {
        let store = SqlStore::open_in_memory()
            .await
            .expect("Failed to open store");
        store.migrate().await.expect("Failed to run migrations");
        let store = Arc::new(store);

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            database_url: "sqlite::memory:".into(),
            auth_secret: Some(TEST_SECRET.into()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            page_size,
        };

        let state = AppState::new(Arc::clone(&store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, store }
    }

    /// Mint a bearer token for a user id, signed with the test secret.
    pub fn token_for(&self, user_id: i64) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .expect("Failed to sign token")
    }

    /// Authorization header value for a user id.
    pub fn auth_header(&self, user_id: i64) -> String {
        format!("Bearer {}", self.token_for(user_id))
    }
}
