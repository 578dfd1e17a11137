//! Blob Storage
//!
//! A chunked binary object store keyed by store-assigned identifiers, with
//! streamed writes, streamed reads, and per-object metadata.
//!
//! # Architecture
//!
//! - **`blob`** - object/metadata types, error type, and the `BlobStore` /
//!   `BlobWriter` traits
//! - **`postgres`** - chunk rows + object index over sqlx/Postgres
//! - **`memory`** - in-memory implementation (tests, and the fallback when
//!   no database is configured)
//!
//! # Commit Protocol
//!
//! A write stages ordered chunks under a handle; nothing is visible to
//! readers until `finalize` installs the object-index entry and returns the
//! assigned identifier. A failed or abandoned write is discarded with
//! `abort` and never surfaces a partial object.

/// Types and traits
pub mod blob;

/// In-memory implementation
pub mod memory;

/// Postgres implementation
pub mod postgres;

pub use blob::{BlobError, BlobObject, BlobRead, BlobStore, BlobWriter};
pub use memory::MemoryBlobStore;
pub use postgres::PgBlobStore;
