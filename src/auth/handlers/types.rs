/**
 * Authentication Handler Types
 *
 * Request and response types for the auth endpoints. Field names on the
 * wire follow what the front end sends: several requests use camelCase
 * (`usernameOrEmail`, `newPassword`), and the role arrives as a free string
 * that is validated against the closed role set in the handler so an
 * unknown value is a 400 rather than a deserialization failure.
 */

use serde::{Deserialize, Serialize};

use crate::users::Role;

/// Registration request.
#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    /// Plaintext; hashed before storage, never logged
    pub password: String,
    /// Validated against the closed role set by the handler
    pub role: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Login request.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username, or email if the value contains `@`
    pub username_or_email: String,
    pub password: String,
}

/// Forgot-password request.
#[derive(Deserialize, Serialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password request.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Change-password request. The bearer token admits the caller; the
/// current password is still re-verified.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub username_or_email: String,
}

/// Account information safe to return to clients. No hash, no reset token.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Registration response: the created account plus a token for immediate
/// authentication.
#[derive(Serialize, Debug)]
pub struct RegisterResponse {
    pub message: String,
    pub user: AccountResponse,
    pub token: String,
}

/// Login response.
#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub username: String,
}

/// Generic message-only response.
#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}
