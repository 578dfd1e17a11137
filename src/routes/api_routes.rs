/**
 * API Route Table
 *
 * ## Authentication (public)
 * - `POST /api/auth/register` - create account, returns token
 * - `POST /api/auth/login` - verify credentials, returns token
 * - `POST /api/auth/forgot-password` - issue reset token, send email
 * - `POST /api/auth/reset-password` - redeem reset token
 *
 * ## Authentication (gated)
 * - `POST /api/auth/change-password` - any authenticated role; the gate
 *   admits the request before the body is read
 *
 * ## Avatars
 * - `POST /api/users/upload-avatar` - multipart upload (username + file);
 *   carries a body limit slightly above the 5 MiB content cap so oversized
 *   requests die at the transport layer too
 * - `GET /api/users/avatar/{id}` - streamed download
 */

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::handlers::{
    change_password, forgot_password, login, register, reset_password,
};
use crate::avatar::handlers::{get_avatar, upload_avatar};
use crate::avatar::MAX_AVATAR_BYTES;
use crate::middleware::auth::{authorize, RoleGate};
use crate::server::state::AppState;
use crate::users::Role;

/// Headroom for multipart framing and the username field on top of the
/// avatar content cap.
const UPLOAD_BODY_LIMIT: usize = MAX_AVATAR_BYTES as usize + 64 * 1024;

pub fn configure_api_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        // Authentication endpoints
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route(
            "/api/auth/change-password",
            post(change_password).route_layer(middleware::from_fn_with_state(
                RoleGate::new(state, Role::ALL),
                authorize,
            )),
        )
        // Avatar endpoints
        .route(
            "/api/users/upload-avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/users/avatar/{id}", get(get_avatar))
}
