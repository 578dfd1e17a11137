/**
 * Login Handler
 *
 * `POST /api/auth/login`
 *
 * Looks the account up by username or email, verifies the password, and
 * returns a bearer token with the role and username.
 *
 * Unknown identity and wrong password produce byte-identical rejections so
 * the endpoint cannot be used to enumerate accounts.
 */

use axum::{extract::State, response::Json};

use crate::auth::credentials;
use crate::auth::handlers::types::{LoginRequest, LoginResponse};
use crate::error::ApiError;
use crate::server::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.username_or_email.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation(
            "Username/Email and Password are required",
        ));
    }

    tracing::info!(identifier = %request.username_or_email, "login request");

    let account = state
        .users
        .find_by_username_or_email(&request.username_or_email)
        .await?
        .ok_or_else(|| {
            tracing::warn!(identifier = %request.username_or_email, "login: unknown identity");
            ApiError::validation(INVALID_CREDENTIALS)
        })?;

    let valid = credentials::verify(&request.password, &account.password_hash).await?;
    if !valid {
        tracing::warn!(username = %account.username, "login: wrong password");
        return Err(ApiError::validation(INVALID_CREDENTIALS));
    }

    let token = state
        .tokens
        .issue(account.id, &account.username, account.role)?;

    tracing::info!(username = %account.username, "user logged in");

    Ok(Json(LoginResponse {
        token,
        role: account.role,
        username: account.username,
    }))
}
