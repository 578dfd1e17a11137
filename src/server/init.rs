/**
 * Server Initialization
 *
 * Assembles the application: configuration, persistent stores (Postgres
 * when configured, in-memory otherwise), the outbound mailer, the shared
 * state, and finally the router.
 *
 * The assembly is resilient: a missing database or mailer downgrades to an
 * in-process substitute with a warning instead of refusing to start.
 */

use axum::Router;

use crate::server::config::{build_stores, load_database, load_mailer, ServerConfig};
use crate::server::state::AppState;
use crate::routes::create_router;

/// Create the application from the environment.
pub async fn create_app() -> Router {
    tracing::info!("Initializing staffdesk backend server");

    // Step 1: process-wide configuration
    let config = ServerConfig::from_env();

    // Step 2: persistent stores (Postgres or in-memory fallback)
    let pool = load_database().await;
    let (users, blobs) = build_stores(pool);

    // Step 3: outbound mailer (SMTP or logging fallback)
    let mailer = load_mailer();

    // Step 4: shared state wiring the composed services
    let state = AppState::new(users, blobs, mailer, config);

    // Step 5: router with all routes and layers
    create_router(state)
}
