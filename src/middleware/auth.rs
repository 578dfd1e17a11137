/**
 * Access-Control Gate
 *
 * Middleware protecting routes behind a bearer token and a per-route role
 * allow-list:
 *
 * 1. Extract the token from the `Authorization: Bearer <token>` header;
 *    absence or a malformed header is 401.
 * 2. Verify signature and expiry; failures are 401, with a distinct
 *    message when the token is merely expired.
 * 3. Check the claim role against the route's allow-list; a valid identity
 *    with the wrong role is 403, distinct from 401.
 * 4. Attach the verified claims to request extensions and proceed.
 *
 * Applied as a `route_layer`, so no request body is read and no handler
 * runs until the gate admits the request.
 */

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::TokenIssuer;
use crate::error::ApiError;
use crate::server::state::AppState;
use crate::users::Role;

/// Verified identity attached to admitted requests.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub account_id: Uuid,
    pub username: String,
    pub role: Role,
}

/// Per-route gate configuration: the verifier plus the allowed roles.
#[derive(Clone)]
pub struct RoleGate {
    tokens: Arc<TokenIssuer>,
    allowed: &'static [Role],
}

impl RoleGate {
    pub fn new(state: &AppState, allowed: &'static [Role]) -> Self {
        Self {
            tokens: state.tokens.clone(),
            allowed,
        }
    }

    /// The admission decision: header shape, token verification, role
    /// check. Returns the identity to attach, or the rejection.
    fn admit(&self, auth_header: Option<&str>) -> Result<AuthenticatedUser, ApiError> {
        let auth_header = auth_header.ok_or_else(|| {
            tracing::warn!("missing Authorization header");
            ApiError::unauthenticated("Authorization token missing or invalid")
        })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            tracing::warn!("malformed Authorization header");
            ApiError::unauthenticated("Authorization token missing or invalid")
        })?;

        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::warn!(reason = %e, "token rejected");
            ApiError::from(e)
        })?;

        if !self.allowed.contains(&claims.role) {
            tracing::warn!(username = %claims.username, role = %claims.role, "role not allowed for route");
            return Err(ApiError::forbidden("Access denied"));
        }

        let account_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::internal("non-uuid subject in verified token"))?;

        Ok(AuthenticatedUser {
            account_id,
            username: claims.username,
            role: claims.role,
        })
    }
}

/// The gate itself; use with `middleware::from_fn_with_state` and a
/// [`RoleGate`] as the state.
pub async fn authorize(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let user = gate.admit(header)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extractor handing handlers the identity the gate attached.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                ApiError::unauthenticated("Authorization token missing or invalid")
            })?;

        Ok(AuthUser(user))
    }
}
