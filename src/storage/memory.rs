/**
 * In-Memory Blob Store
 *
 * Staged chunks live inside the writer itself, so an in-progress write is
 * structurally invisible to readers; `finalize` takes the store lock once
 * to install the object. Used by the test suite and as the fallback when no
 * database is configured.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures_util::stream;
use uuid::Uuid;

use super::blob::{
    BlobError, BlobObject, BlobRead, BlobStore, BlobWriter, Chunker,
};

struct StoredObject {
    object: BlobObject,
    chunks: Vec<Bytes>,
}

/// In-memory chunked object storage.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Arc<Mutex<HashMap<Uuid, StoredObject>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers of every committed object.
    pub fn list(&self) -> Vec<Uuid> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .copied()
            .collect()
    }
}

struct MemoryBlobWriter {
    objects: Arc<Mutex<HashMap<Uuid, StoredObject>>>,
    name: String,
    content_type: String,
    metadata: HashMap<String, String>,
    chunker: Chunker,
    chunks: Vec<Bytes>,
    length: u64,
}

#[async_trait]
impl BlobWriter for MemoryBlobWriter {
    async fn write(&mut self, fragment: &[u8]) -> Result<(), BlobError> {
        self.length += fragment.len() as u64;
        self.chunks.extend(self.chunker.push(fragment));
        Ok(())
    }

    async fn finalize(mut self: Box<Self>) -> Result<Uuid, BlobError> {
        if let Some(tail) = self.chunker.flush() {
            self.chunks.push(tail);
        }

        // The identifier exists only from this point on.
        let id = Uuid::new_v4();
        let object = BlobObject {
            id,
            name: self.name,
            length: self.length,
            chunk_count: self.chunks.len() as u32,
            content_type: self.content_type,
            metadata: self.metadata,
            created_at: Utc::now(),
        };

        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                id,
                StoredObject {
                    object,
                    chunks: self.chunks,
                },
            );
        Ok(id)
    }

    async fn abort(self: Box<Self>) -> Result<(), BlobError> {
        // Staged chunks are dropped with the writer.
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn open_write(
        &self,
        name: &str,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<Box<dyn BlobWriter>, BlobError> {
        Ok(Box::new(MemoryBlobWriter {
            objects: self.objects.clone(),
            name: name.to_string(),
            content_type: content_type.to_string(),
            metadata,
            chunker: Chunker::new(),
            chunks: Vec::new(),
            length: 0,
        }))
    }

    async fn open_read(&self, id: Uuid) -> Result<BlobRead, BlobError> {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        let stored = objects.get(&id).ok_or(BlobError::NotFound(id))?;

        // Bytes clones are reference-counted; a reader keeps streaming its
        // snapshot even if the object is deleted mid-read.
        let chunks: Vec<Result<Bytes, BlobError>> =
            stored.chunks.iter().cloned().map(Ok).collect();
        Ok(BlobRead {
            object: stored.object.clone(),
            stream: Box::pin(stream::iter(chunks)),
        })
    }

    async fn update_metadata(
        &self,
        id: Uuid,
        patch: HashMap<String, String>,
    ) -> Result<(), BlobError> {
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        let stored = objects.get_mut(&id).ok_or(BlobError::NotFound(id))?;
        stored.object.metadata.extend(patch);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, BlobError> {
        Ok(self
            .objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id)
            .is_some())
    }
}
