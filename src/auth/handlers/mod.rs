//! Authentication Handlers
//!
//! HTTP handlers for the auth endpoints:
//!
//! - **`types`** - request/response types (wire field names follow the
//!   front end's camelCase where it expects them)
//! - **`register`** - `POST /api/auth/register`
//! - **`login`** - `POST /api/auth/login`
//! - **`password`** - `POST /api/auth/forgot-password`,
//!   `POST /api/auth/reset-password`, `POST /api/auth/change-password`

/// Request/response types
pub mod types;

/// User registration handler
pub mod register;

/// User authentication handler
pub mod login;

/// Forgot/reset/change password handlers
pub mod password;

pub use login::login;
pub use password::{change_password, forgot_password, reset_password};
pub use register::register;
