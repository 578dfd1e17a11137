//! Error Module
//!
//! Defines the error taxonomy shared by every HTTP handler and the
//! conversions that turn component-level errors into HTTP responses.
//!
//! # Architecture
//!
//! - **`types`** - The `ApiError` taxonomy and `From` conversions from
//!   component errors (store, blob, token, credential, reset, avatar)
//! - **`conversion`** - `IntoResponse` implementation rendering errors as
//!   JSON bodies
//!
//! # Error Classes
//!
//! | Class           | Status | Meaning                                      |
//! |-----------------|--------|----------------------------------------------|
//! | `Validation`    | 400    | Missing or malformed input                   |
//! | `Unauthenticated` | 401  | Bad/absent credentials or token              |
//! | `Forbidden`     | 403    | Valid identity, insufficient role            |
//! | `NotFound`      | 404    | Unknown user, object, or route               |
//! | `Conflict`      | 409    | Duplicate username or email                  |
//! | `Internal`      | 500    | Unexpected failure; detail logged, not shown |

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::ApiError;
