/**
 * Register Handler
 *
 * `POST /api/auth/register`
 *
 * 1. Validate presence of username, email, password and a role from the
 *    closed set
 * 2. Hash the password
 * 3. Create the account (duplicate username/email is a 409)
 * 4. Issue a bearer token so the caller is authenticated immediately
 *
 * The response carries the account's public fields only; the plaintext
 * password and the stored hash never leave the server.
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::auth::credentials;
use crate::auth::handlers::types::{AccountResponse, RegisterRequest, RegisterResponse};
use crate::error::ApiError;
use crate::server::state::AppState;
use crate::users::{NewAccount, Role};

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if request.username.is_empty()
        || request.email.is_empty()
        || request.password.is_empty()
        || request.role.is_empty()
    {
        return Err(ApiError::validation(
            "Username, email, password, and role are required",
        ));
    }

    let role: Role = request
        .role
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid role: {}", request.role)))?;

    tracing::info!(username = %request.username, email = %request.email, "registration request");

    let password_hash = credentials::hash(&request.password).await?;

    let account = state
        .users
        .insert(NewAccount {
            username: request.username,
            email: request.email,
            password_hash,
            role,
            first_name: request.first_name.unwrap_or_default(),
            last_name: request.last_name.unwrap_or_default(),
        })
        .await?;

    let token = state
        .tokens
        .issue(account.id, &account.username, account.role)?;

    tracing::info!(username = %account.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: AccountResponse {
                id: account.id.to_string(),
                username: account.username,
                email: account.email,
                role: account.role,
            },
            token,
        }),
    ))
}
