//! Avatar Pipeline
//!
//! Composes the blob store with account updates: validates incoming image
//! content, streams it into storage, and links the committed object to the
//! owning account.
//!
//! # Architecture
//!
//! - **`pipeline`** - the two-phase upload (stream ingestion, then
//!   metadata/account attachment) and the fetch path
//! - **`handlers`** - HTTP handlers for the multipart upload endpoint and
//!   the streamed avatar download
//!
//! The upload is deliberately two explicit phases because multipart fields
//! arrive in client order: the file stream may be fully ingested before the
//! `username` field has been seen. Phase one commits the object; phase two
//! attaches ownership metadata (best-effort) and updates the account.

/// Upload/fetch pipeline
pub mod pipeline;

/// HTTP handlers
pub mod handlers;

pub use pipeline::{AvatarError, AvatarPipeline, AvatarUpload, MAX_AVATAR_BYTES};
