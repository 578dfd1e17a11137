//! Shared test helpers
//!
//! Builds the full application over in-memory stores, a recording mailer,
//! and a fixed token secret, and returns handles to the fakes so tests can
//! inspect persisted state directly.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use staffdesk::email::MemoryMailer;
use staffdesk::routes::create_router;
use staffdesk::server::{AppState, ServerConfig};
use staffdesk::storage::MemoryBlobStore;
use staffdesk::users::MemoryUserStore;

pub const TEST_SECRET: &str = "test-secret";
pub const PUBLIC_URL: &str = "http://localhost:3000";

pub struct TestApp {
    pub server: TestServer,
    pub users: Arc<MemoryUserStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub mailer: Arc<MemoryMailer>,
}

pub fn create_test_app() -> TestApp {
    let users = Arc::new(MemoryUserStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let mailer = Arc::new(MemoryMailer::new());

    let config = ServerConfig {
        jwt_secret: TEST_SECRET.to_string(),
        public_url: PUBLIC_URL.to_string(),
        cors_origin: PUBLIC_URL.to_string(),
    };

    let state = AppState::new(users.clone(), blobs.clone(), mailer.clone(), config);
    let server = TestServer::new(create_router(state)).unwrap();

    TestApp {
        server,
        users,
        blobs,
        mailer,
    }
}

/// Register an account through the HTTP surface and return the issued
/// token.
pub async fn register_user(
    server: &TestServer,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
            "role": role,
            "first_name": "Test",
            "last_name": "User"
        }))
        .await;

    assert_eq!(response.status_code(), axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    body["token"].as_str().expect("token in response").to_string()
}
