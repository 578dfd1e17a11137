//! Middleware Module
//!
//! Request-pipeline stages applied before handlers run. Currently:
//!
//! - **`auth`** - the access-control gate: bearer-token extraction,
//!   verification, and role-based admission

pub mod auth;

pub use auth::{authorize, AuthUser, AuthenticatedUser, RoleGate};
