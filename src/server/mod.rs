//! Server Module
//!
//! Configuration loading, the shared application state, and app assembly.
//!
//! - **`config`** - environment-driven configuration and optional-service
//!   loading (database, SMTP); missing services degrade with a warning
//! - **`state`** - `AppState` and the `FromRef` extractions handlers use
//! - **`init`** - `create_app`, wiring config → stores → state → router

/// Configuration loading
pub mod config;

/// Application state
pub mod state;

/// App assembly
pub mod init;

pub use config::ServerConfig;
pub use init::create_app;
pub use state::AppState;
