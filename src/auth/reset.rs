/**
 * Reset-Token Manager
 *
 * Issues and resolves single-use, expiring password-reset tokens. A reset
 * token is a random opaque value, unrelated to the signed bearer tokens:
 * possession proves control of the account's registered mailbox, nothing
 * more.
 *
 * Resolution matches token equality and unexpired expiry in one store
 * predicate, so a wrong token and an expired one produce the same
 * rejection and the endpoint cannot be used as an oracle.
 */

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::RngCore;
use thiserror::Error;

use crate::auth::credentials::{self, CredentialError};
use crate::email::Mailer;
use crate::users::{StoreError, UserStore};

/// Reset tokens are valid for 15 minutes from issuance.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 15;

/// Errors from the reset flows.
#[derive(Debug, Error)]
pub enum ResetError {
    /// `request_reset` for an unregistered email; revealed to the caller
    #[error("user not found")]
    UserNotFound,

    /// Wrong token or expired token; deliberately indistinguishable
    #[error("invalid or expired token")]
    InvalidOrExpired,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Owns the forgot-password and reset-password flows.
pub struct ResetManager {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    public_url: String,
}

impl ResetManager {
    pub fn new(users: Arc<dyn UserStore>, mailer: Arc<dyn Mailer>, public_url: String) -> Self {
        Self {
            users,
            mailer,
            public_url,
        }
    }

    /// Generate a reset token for the account registered under `email`,
    /// persist it with its expiry, and dispatch the recovery email.
    ///
    /// The account mutation is committed before the email goes out; a mail
    /// failure is logged and swallowed, never retried, and never rolls the
    /// token back.
    pub async fn request_reset(&self, email: &str) -> Result<(), ResetError> {
        let mut account = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(ResetError::UserNotFound)?;

        let token = generate_token();
        account.reset_token = Some(token.clone());
        account.reset_token_expiry = Some(Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES));
        self.users.update(&account).await?;

        tracing::info!(username = %account.username, "password reset token issued");

        let reset_link = format!("{}/reset-password/{}", self.public_url, token);
        let body = format!(
            r#"Click <a href="{}">here</a> to reset your password."#,
            reset_link
        );
        if let Err(e) = self
            .mailer
            .send(&account.email, "Reset Your Password", &body)
            .await
        {
            tracing::error!(error = %e, username = %account.username, "failed to send reset email");
        }

        Ok(())
    }

    /// Exchange a valid reset token for a new password. The token is
    /// cleared on success and cannot be resolved twice.
    pub async fn resolve_reset(&self, token: &str, new_password: &str) -> Result<(), ResetError> {
        let mut account = self
            .users
            .find_by_valid_reset_token(token, Utc::now())
            .await?
            .ok_or(ResetError::InvalidOrExpired)?;

        account.password_hash = credentials::hash(new_password).await?;
        account.reset_token = None;
        account.reset_token_expiry = None;
        self.users.update(&account).await?;

        tracing::info!(username = %account.username, "password reset completed");
        Ok(())
    }
}

/// 32 random bytes, hex-encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
