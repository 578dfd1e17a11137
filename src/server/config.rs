/**
 * Server Configuration
 *
 * Loads configuration from environment variables once at startup into an
 * explicit `ServerConfig`, which is injected into components at
 * construction. Nothing reads configuration ambiently after startup, so
 * tests can run every component against fake stores and throwaway secrets.
 *
 * Optional services are resilient: a missing `DATABASE_URL` falls back to
 * the in-memory stores, missing SMTP settings fall back to a logging
 * mailer. Errors are logged but do not prevent server startup.
 */

use std::sync::Arc;

use sqlx::PgPool;

use crate::email::smtp::{SmtpConfig, SmtpMailer};
use crate::email::{LogMailer, Mailer};
use crate::storage::{BlobStore, MemoryBlobStore, PgBlobStore};
use crate::users::{MemoryUserStore, PgUserStore, UserStore};

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Secret for signing bearer tokens
    pub jwt_secret: String,
    /// Base URL used in avatar links and reset emails
    pub public_url: String,
    /// Allowed CORS origin for the browser front end
    pub cors_origin: String,
}

impl ServerConfig {
    /// Load from environment variables with development defaults.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using an insecure development secret");
            "change-me-in-production".to_string()
        });

        let public_url =
            std::env::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Self {
            jwt_secret,
            public_url,
            cors_origin,
        }
    }
}

/// Load and initialize the database connection pool.
///
/// Reads `DATABASE_URL`, connects, and runs embedded migrations. Returns
/// `None` if the variable is unset or the connection fails; the server then
/// runs on the in-memory stores.
pub async fn load_database() -> Option<PgPool> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; falling back to in-memory stores");
            return None;
        }
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to in-memory stores");
            return None;
        }
    };

    tracing::info!("Database connection pool created");

    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed"),
        Err(e) => {
            // Migrations may already have been applied by another instance.
            tracing::error!("Failed to run database migrations: {:?}", e);
            tracing::warn!("Continuing; database might not be up to date");
        }
    }

    Some(pool)
}

/// Build the user and blob stores over the pool, or in-memory when absent.
pub fn build_stores(pool: Option<PgPool>) -> (Arc<dyn UserStore>, Arc<dyn BlobStore>) {
    match pool {
        Some(pool) => (
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgBlobStore::new(pool)),
        ),
        None => (
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryBlobStore::new()),
        ),
    }
}

/// Build the outbound mailer: SMTP when configured, logging otherwise.
pub fn load_mailer() -> Arc<dyn Mailer> {
    let host = std::env::var("SMTP_HOST").ok();
    let from = std::env::var("SMTP_FROM").ok();

    match (host, from) {
        (Some(host), Some(from)) => {
            let config = SmtpConfig {
                host,
                username: std::env::var("SMTP_USERNAME").ok(),
                password: std::env::var("SMTP_PASSWORD").ok(),
                from,
            };
            match SmtpMailer::new(config) {
                Ok(mailer) => {
                    tracing::info!("SMTP mailer configured");
                    Arc::new(mailer)
                }
                Err(e) => {
                    tracing::error!("Failed to configure SMTP mailer: {e}");
                    tracing::warn!("Outbound email will be logged, not sent");
                    Arc::new(LogMailer)
                }
            }
        }
        _ => {
            tracing::warn!("SMTP_HOST/SMTP_FROM not set; outbound email will be logged, not sent");
            Arc::new(LogMailer)
        }
    }
}
