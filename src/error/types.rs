/**
 * API Error Types
 *
 * This module defines the error taxonomy used by HTTP handlers. Every public
 * operation returns a typed outcome; handlers convert component errors into
 * an `ApiError`, which maps onto an HTTP status code and a client-safe
 * message.
 *
 * Internal failures (store unreachable, hashing failure, unexpected I/O) are
 * logged server-side with full detail and exposed to the caller only as a
 * generic "Server error".
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::auth::credentials::CredentialError;
use crate::auth::reset::ResetError;
use crate::auth::sessions::TokenError;
use crate::avatar::pipeline::AvatarError;
use crate::storage::blob::BlobError;
use crate::users::StoreError;

/// Error taxonomy for the HTTP surface.
///
/// Each variant carries a client-facing message. `Internal` additionally
/// carries the server-side detail, which is logged on conversion to a
/// response and never serialized into the body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input (unknown role value, absent field, ...)
    #[error("{0}")]
    Validation(String),

    /// Authentication failure: bad credentials, invalid or expired token,
    /// malformed auth header
    #[error("{0}")]
    Unauthenticated(String),

    /// Valid identity but insufficient role for the route
    #[error("{0}")]
    Forbidden(String),

    /// Unknown user, object, or reset token
    #[error("{0}")]
    NotFound(String),

    /// Duplicate username or email
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure; the string is server-side detail only
    #[error("Server error")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// HTTP status code for this error class.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal detail is replaced by a generic
    /// message here; the detail itself is only emitted to the log.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(m)
            | Self::Unauthenticated(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m) => m.clone(),
            Self::Internal(_) => "Server error".to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { field } => {
                Self::Conflict(format!("{} already exists", field))
            }
            StoreError::NotFound => Self::NotFound("Record not found".to_string()),
            StoreError::Backend(detail) => Self::Internal(detail),
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound(_) => Self::NotFound("Avatar not found".to_string()),
            BlobError::TooLarge { size, max } => Self::Validation(format!(
                "File too large: {} bytes (limit {} bytes)",
                size, max
            )),
            BlobError::Backend(detail) => Self::Internal(detail),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::Unauthenticated(
                "Your session has expired. Please log in again.".to_string(),
            ),
            TokenError::Malformed | TokenError::InvalidSignature => {
                Self::Unauthenticated("Invalid token".to_string())
            }
            TokenError::Encoding(detail) => Self::Internal(detail),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ResetError> for ApiError {
    fn from(err: ResetError) -> Self {
        match err {
            ResetError::UserNotFound => Self::NotFound("User not found".to_string()),
            ResetError::InvalidOrExpired => {
                Self::Validation("Invalid or expired token".to_string())
            }
            ResetError::Store(e) => Self::from(e),
            ResetError::Credential(e) => Self::from(e),
        }
    }
}

impl From<AvatarError> for ApiError {
    fn from(err: AvatarError) -> Self {
        match err {
            AvatarError::NotAnImage => {
                Self::Validation("Only image files are allowed".to_string())
            }
            AvatarError::UserNotFound => Self::NotFound("User not found.".to_string()),
            AvatarError::NotFound => Self::NotFound("Avatar not found".to_string()),
            AvatarError::Blob(e) => Self::from(e),
            AvatarError::Store(e) => Self::from(e),
        }
    }
}
