/**
 * Application State
 *
 * `AppState` is the central container handed to the router: the persistent
 * stores, the outbound mailer, the token issuer, and the composed services
 * built over them. Everything is injected here at construction, with no
 * ambient global state, so the whole stack can be assembled over
 * in-memory fakes in tests.
 *
 * `FromRef` implementations let handlers extract just the service they use
 * instead of the whole state.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::sessions::TOKEN_TTL;
use crate::auth::{ResetManager, TokenIssuer};
use crate::avatar::AvatarPipeline;
use crate::email::Mailer;
use crate::server::config::ServerConfig;
use crate::storage::BlobStore;
use crate::users::UserStore;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Account storage
    pub users: Arc<dyn UserStore>,
    /// Avatar blob storage
    pub blobs: Arc<dyn BlobStore>,
    /// Outbound email
    pub mailer: Arc<dyn Mailer>,
    /// Bearer-token issuance and verification
    pub tokens: Arc<TokenIssuer>,
    /// Forgot/reset password flows
    pub reset: Arc<ResetManager>,
    /// Avatar upload/fetch pipeline
    pub avatars: Arc<AvatarPipeline>,
    /// Process-wide configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire the composed services over the injected stores and mailer.
    pub fn new(
        users: Arc<dyn UserStore>,
        blobs: Arc<dyn BlobStore>,
        mailer: Arc<dyn Mailer>,
        config: ServerConfig,
    ) -> Self {
        let config = Arc::new(config);
        let tokens = Arc::new(TokenIssuer::new(&config.jwt_secret, TOKEN_TTL));
        let reset = Arc::new(ResetManager::new(
            users.clone(),
            mailer.clone(),
            config.public_url.clone(),
        ));
        let avatars = Arc::new(AvatarPipeline::new(
            blobs.clone(),
            users.clone(),
            config.public_url.clone(),
        ));

        Self {
            users,
            blobs,
            mailer,
            tokens,
            reset,
            avatars,
            config,
        }
    }
}

impl FromRef<AppState> for Arc<dyn UserStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.users.clone()
    }
}

impl FromRef<AppState> for Arc<dyn BlobStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.blobs.clone()
    }
}

impl FromRef<AppState> for Arc<TokenIssuer> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for Arc<ResetManager> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.reset.clone()
    }
}

impl FromRef<AppState> for Arc<AvatarPipeline> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.avatars.clone()
    }
}
