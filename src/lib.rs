//! Staffdesk - HR Admin Backend
//!
//! The credential and content-storage core of the staffdesk HR admin
//! application: password hashing, signed bearer tokens, time-boxed
//! password-reset tokens, role-gated authorization, and a chunked blob
//! store backing user avatars.
//!
//! # Module Structure
//!
//! - **`server`** - configuration, application state, app assembly
//! - **`routes`** - router and API route table
//! - **`auth`** - credential hashing, token issuance/verification,
//!   password-reset flows, auth endpoint handlers
//! - **`middleware`** - the access-control gate
//! - **`users`** - Account model, Role, and the `UserStore` backends
//! - **`storage`** - the chunked `BlobStore` backends
//! - **`avatar`** - avatar upload/fetch pipeline and handlers
//! - **`email`** - outbound mail dispatch
//! - **`error`** - error taxonomy and HTTP conversion
//!
//! # Design
//!
//! Every component receives its collaborators at construction: stores,
//! mailer, and token secret are injected through `AppState`, never read
//! from ambient globals. The persistent backends (Postgres) have in-memory
//! siblings, so the full HTTP surface runs in tests without external
//! services.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Authentication and password management
pub mod auth;

/// Request middleware
pub mod middleware;

/// Account model and storage
pub mod users;

/// Chunked blob storage
pub mod storage;

/// Avatar pipeline
pub mod avatar;

/// Outbound email
pub mod email;

/// Error taxonomy
pub mod error;

pub use error::ApiError;
pub use server::{create_app, AppState, ServerConfig};
