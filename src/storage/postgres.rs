/**
 * Postgres Blob Store
 *
 * Two correlated tables: `avatar_files` (the object index) and
 * `avatar_chunks` (ordered binary fragments keyed by file id + sequence
 * number). Chunks are staged under a provisional file id while the write is
 * in flight; the object only becomes visible when `finalize` inserts the
 * index row, so readers never observe a partial object. `abort`, or a
 * failed finalize, deletes the staged chunk rows.
 *
 * Reads stream one chunk row per poll, so a slow consumer holds back the
 * database fetches instead of forcing the whole object into memory.
 */

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::stream;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::blob::{
    BlobError, BlobObject, BlobRead, BlobStore, BlobWriter, Chunker,
};

/// Chunked blob storage over a Postgres connection pool.
pub struct PgBlobStore {
    pool: PgPool,
}

impl PgBlobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FileRow {
    id: Uuid,
    name: String,
    length: i64,
    chunk_count: i32,
    content_type: String,
    metadata: Json<HashMap<String, String>>,
    created_at: DateTime<Utc>,
}

impl From<FileRow> for BlobObject {
    fn from(row: FileRow) -> Self {
        BlobObject {
            id: row.id,
            name: row.name,
            length: row.length as u64,
            chunk_count: row.chunk_count as u32,
            content_type: row.content_type,
            metadata: row.metadata.0,
            created_at: row.created_at,
        }
    }
}

fn backend(err: sqlx::Error) -> BlobError {
    BlobError::Backend(err.to_string())
}

struct PgBlobWriter {
    pool: PgPool,
    /// Keys the staged chunk rows; becomes the object id once the index row
    /// is inserted at finalize.
    file_id: Uuid,
    name: String,
    content_type: String,
    metadata: HashMap<String, String>,
    chunker: Chunker,
    next_seq: i32,
    length: u64,
}

impl PgBlobWriter {
    async fn insert_chunk(&mut self, data: Bytes) -> Result<(), BlobError> {
        sqlx::query("INSERT INTO avatar_chunks (file_id, seq, data) VALUES ($1, $2, $3)")
            .bind(self.file_id)
            .bind(self.next_seq)
            .bind(data.as_ref())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        self.next_seq += 1;
        Ok(())
    }

    async fn discard_chunks(pool: &PgPool, file_id: Uuid) {
        if let Err(e) = sqlx::query("DELETE FROM avatar_chunks WHERE file_id = $1")
            .bind(file_id)
            .execute(pool)
            .await
        {
            tracing::warn!(file_id = %file_id, error = %e, "failed to discard staged chunks");
        }
    }
}

#[async_trait]
impl BlobWriter for PgBlobWriter {
    async fn write(&mut self, fragment: &[u8]) -> Result<(), BlobError> {
        self.length += fragment.len() as u64;
        for chunk in self.chunker.push(fragment) {
            self.insert_chunk(chunk).await?;
        }
        Ok(())
    }

    async fn finalize(mut self: Box<Self>) -> Result<Uuid, BlobError> {
        if let Some(tail) = self.chunker.flush() {
            self.insert_chunk(tail).await?;
        }

        let result = sqlx::query(
            r#"
            INSERT INTO avatar_files (id, name, length, chunk_count, content_type, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(self.file_id)
        .bind(&self.name)
        .bind(self.length as i64)
        .bind(self.next_seq)
        .bind(&self.content_type)
        .bind(Json(&self.metadata))
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(self.file_id),
            Err(e) => {
                // No index row was written; the object must not half-exist.
                Self::discard_chunks(&self.pool, self.file_id).await;
                Err(backend(e))
            }
        }
    }

    async fn abort(self: Box<Self>) -> Result<(), BlobError> {
        Self::discard_chunks(&self.pool, self.file_id).await;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for PgBlobStore {
    async fn open_write(
        &self,
        name: &str,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<Box<dyn BlobWriter>, BlobError> {
        Ok(Box::new(PgBlobWriter {
            pool: self.pool.clone(),
            file_id: Uuid::new_v4(),
            name: name.to_string(),
            content_type: content_type.to_string(),
            metadata,
            chunker: Chunker::new(),
            next_seq: 0,
            length: 0,
        }))
    }

    async fn open_read(&self, id: Uuid) -> Result<BlobRead, BlobError> {
        let row = sqlx::query_as::<_, FileRow>(
            "SELECT id, name, length, chunk_count, content_type, metadata, created_at \
             FROM avatar_files WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or(BlobError::NotFound(id))?;

        let object: BlobObject = row.into();
        let chunk_count = object.chunk_count as i32;
        let pool = self.pool.clone();

        let chunk_stream = stream::try_unfold(0i32, move |seq| {
            let pool = pool.clone();
            async move {
                if seq >= chunk_count {
                    return Ok(None);
                }
                let (data,): (Vec<u8>,) =
                    sqlx::query_as("SELECT data FROM avatar_chunks WHERE file_id = $1 AND seq = $2")
                        .bind(id)
                        .bind(seq)
                        .fetch_one(&pool)
                        .await
                        .map_err(backend)?;
                Ok(Some((Bytes::from(data), seq + 1)))
            }
        });

        Ok(BlobRead {
            object,
            stream: Box::pin(chunk_stream),
        })
    }

    async fn update_metadata(
        &self,
        id: Uuid,
        patch: HashMap<String, String>,
    ) -> Result<(), BlobError> {
        let result = sqlx::query("UPDATE avatar_files SET metadata = metadata || $2 WHERE id = $1")
            .bind(id)
            .bind(Json(&patch))
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(BlobError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, BlobError> {
        let result = sqlx::query("DELETE FROM avatar_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        sqlx::query("DELETE FROM avatar_chunks WHERE file_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }
}
