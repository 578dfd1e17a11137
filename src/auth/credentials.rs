/**
 * Credential Hasher
 *
 * One-way password hashing and verification over bcrypt. The cost factor is
 * fixed at bcrypt's default; verification delegates to bcrypt's own
 * comparison, which runs in time independent of where a mismatch occurs.
 *
 * Both operations run the bcrypt computation on the blocking thread pool so
 * a hash (tens of milliseconds of pure CPU) never stalls the request
 * executor. Neither operation logs or returns the plaintext.
 */

use bcrypt::DEFAULT_COST;
use thiserror::Error;

/// Errors from hashing or verification.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    /// The blocking task was cancelled or panicked
    #[error("hashing task failed")]
    Task,
}

/// Hash a plaintext password.
pub async fn hash(plaintext: &str) -> Result<String, CredentialError> {
    let plaintext = plaintext.to_string();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, DEFAULT_COST))
        .await
        .map_err(|_| CredentialError::Task)??;
    Ok(hashed)
}

/// Verify a plaintext password against a stored hash.
pub async fn verify(plaintext: &str, stored_hash: &str) -> Result<bool, CredentialError> {
    let plaintext = plaintext.to_string();
    let stored_hash = stored_hash.to_string();
    let matched = tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &stored_hash))
        .await
        .map_err(|_| CredentialError::Task)??;
    Ok(matched)
}
