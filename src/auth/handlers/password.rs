/**
 * Password Handlers
 *
 * `POST /api/auth/forgot-password` - issue a reset token and mail the
 * recovery link. An unknown email is reported as 404.
 *
 * `POST /api/auth/reset-password` - exchange a valid reset token for a new
 * password. Wrong and expired tokens share one rejection.
 *
 * `POST /api/auth/change-password` - authenticated self-service change.
 * The route sits behind the access-control gate, and the current password
 * is re-verified anyway before anything is written.
 */

use axum::{extract::State, response::Json};

use crate::auth::credentials;
use crate::auth::handlers::types::{
    ChangePasswordRequest, ForgotPasswordRequest, MessageResponse, ResetPasswordRequest,
};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::server::state::AppState;

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    state.reset.request_reset(&request.email).await?;

    Ok(Json(MessageResponse {
        message: "Password reset link sent".to_string(),
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.token.is_empty() || request.new_password.is_empty() {
        return Err(ApiError::validation("Token and new password are required"));
    }

    state
        .reset
        .resolve_reset(&request.token, &request.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.current_password.is_empty()
        || request.new_password.is_empty()
        || request.username_or_email.is_empty()
    {
        return Err(ApiError::validation(
            "Current password, new password, and username/email are required",
        ));
    }

    tracing::info!(caller = %caller.username, target = %request.username_or_email, "change-password request");

    let mut account = state
        .users
        .find_by_username_or_email(&request.username_or_email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let valid = credentials::verify(&request.current_password, &account.password_hash).await?;
    if !valid {
        tracing::warn!(username = %account.username, "change-password: wrong current password");
        return Err(ApiError::validation("Incorrect current password"));
    }

    account.password_hash = credentials::hash(&request.new_password).await?;
    state.users.update(&account).await?;

    tracing::info!(username = %account.username, "password changed");

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}
