//! Route Configuration
//!
//! - **`router`** - assembles the full router: API routes, CORS, request
//!   tracing, body limits, fallback
//! - **`api_routes`** - the API route table, including the role gate on
//!   protected routes

/// Router assembly
pub mod router;

/// API route table
pub mod api_routes;

pub use router::create_router;
