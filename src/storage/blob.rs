/**
 * Blob Store Types and Traits
 *
 * A blob object is an immutable-once-committed byte payload stored as
 * ordered chunks, plus an index entry carrying length, content type, and
 * free-form metadata. Objects are addressed by an identifier the store
 * assigns at finalize; callers never pick identifiers.
 *
 * Metadata may be amended after commit (`update_metadata`) without touching
 * content; the upload flow uses this to attach the owning username once it
 * is known.
 */

use std::collections::HashMap;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::Stream;
use thiserror::Error;
use uuid::Uuid;

/// Upper bound on a single stored chunk. Writers buffer incoming fragments
/// and cut chunks at this size regardless of how the producer framed them.
pub const CHUNK_SIZE: usize = 255 * 1024;

/// Index entry describing one committed object.
#[derive(Debug, Clone)]
pub struct BlobObject {
    pub id: Uuid,
    /// Declared name recorded at upload time
    pub name: String,
    /// Total content length in bytes
    pub length: u64,
    pub chunk_count: u32,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Errors from the blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob {0} not found")]
    NotFound(Uuid),

    #[error("blob too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("blob storage error: {0}")]
    Backend(String),
}

/// Ordered byte fragments of one object, in insertion order.
pub type BlobDataStream = Pin<Box<dyn Stream<Item = Result<Bytes, BlobError>> + Send>>;

/// A committed object plus its content stream.
pub struct BlobRead {
    pub object: BlobObject,
    pub stream: BlobDataStream,
}

impl std::fmt::Debug for BlobRead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobRead")
            .field("object", &self.object)
            .field("stream", &"<stream>")
            .finish()
    }
}

/// Sink for one in-progress write.
///
/// Appends are serialized per object by `&mut` exclusivity; independent
/// writers proceed concurrently. Each append completes before the next is
/// accepted, so a slow backend exerts backpressure on the producer instead
/// of buffering without bound.
#[async_trait]
pub trait BlobWriter: Send {
    /// Append a fragment. May be called repeatedly.
    async fn write(&mut self, chunk: &[u8]) -> Result<(), BlobError>;

    /// Commit all fragments atomically as one readable object and return
    /// the assigned identifier. The sole commit point: until this returns,
    /// no reader can observe the object.
    async fn finalize(self: Box<Self>) -> Result<Uuid, BlobError>;

    /// Discard everything staged by this writer.
    async fn abort(self: Box<Self>) -> Result<(), BlobError>;
}

/// Chunked binary object store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Open a write sink. The object does not exist for readers until the
    /// returned writer is finalized.
    async fn open_write(
        &self,
        name: &str,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<Box<dyn BlobWriter>, BlobError>;

    /// Stream a committed object's content in original order.
    async fn open_read(&self, id: Uuid) -> Result<BlobRead, BlobError>;

    /// Merge fields into an object's metadata without altering content.
    async fn update_metadata(
        &self,
        id: Uuid,
        patch: HashMap<String, String>,
    ) -> Result<(), BlobError>;

    /// Remove the object and all its chunks; returns whether it existed.
    async fn delete(&self, id: Uuid) -> Result<bool, BlobError>;
}

/// Splits incoming fragments into chunks of at most [`CHUNK_SIZE`] bytes.
///
/// Shared by the store implementations: `push` returns any full chunks cut
/// from the buffered bytes, `flush` drains the remainder.
#[derive(Default)]
pub(crate) struct Chunker {
    buffer: Vec<u8>,
}

impl Chunker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(fragment);
        let mut chunks = Vec::new();
        while self.buffer.len() >= CHUNK_SIZE {
            let rest = self.buffer.split_off(CHUNK_SIZE);
            let chunk = std::mem::replace(&mut self.buffer, rest);
            chunks.push(Bytes::from(chunk));
        }
        chunks
    }

    pub fn flush(&mut self) -> Option<Bytes> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(Bytes::from(std::mem::take(&mut self.buffer)))
        }
    }
}
