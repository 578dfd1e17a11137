//! Authentication Module
//!
//! Credential hashing, bearer-token issuance and verification, the
//! password-reset flow, and the HTTP handlers for the auth endpoints.
//!
//! # Architecture
//!
//! - **`credentials`** - one-way password hashing and verification (bcrypt)
//! - **`sessions`** - signed bearer-token issuance and verification (JWT)
//! - **`reset`** - single-use, expiring password-reset tokens
//! - **`handlers`** - HTTP handlers for register, login, forgot-password,
//!   reset-password, and change-password
//!
//! # Authentication Flow
//!
//! 1. **Register**: validate role → hash password → create account → token
//! 2. **Login**: look up by username or email → verify password → token
//! 3. **Forgot**: random token + 15-minute expiry stored on the account,
//!    recovery link mailed out-of-band
//! 4. **Reset**: token matched with unexpired expiry in one predicate →
//!    new hash stored, token cleared (single use)
//!
//! # Security
//!
//! - Passwords are bcrypt-hashed before storage and never logged
//! - Unknown identity and wrong password produce identical rejections
//! - Tokens expire after one hour and are verified with zero leeway
//! - Reset tokens are random values, unrelated to bearer tokens

/// One-way password hashing
pub mod credentials;

/// Bearer-token issuance and verification
pub mod sessions;

/// Password-reset token management
pub mod reset;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use reset::ResetManager;
pub use sessions::{Claims, TokenError, TokenIssuer};
