/**
 * Avatar Upload/Fetch Pipeline
 *
 * Phase one (`store_stream`) validates the declared content type, streams
 * the payload into the blob store while enforcing the size cap on the
 * running total, and finalizes. Overflow or a fragment failure aborts the
 * writer, so nothing partial ever becomes readable.
 *
 * Phase two (`attach_to_account`) enriches the committed object's metadata
 * with the owning username (best-effort: a metadata failure never fails an
 * upload that already succeeded) and points the account's avatar field at
 * the retrieval URL.
 */

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use chrono::Utc;
use futures_util::{Stream, StreamExt};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::blob::{BlobError, BlobRead, BlobStore};
use crate::users::{StoreError, UserStore};

/// Hard cap on avatar content: 5 MiB.
pub const MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;

/// Errors from the avatar pipeline.
#[derive(Debug, Error)]
pub enum AvatarError {
    /// Declared content type is not `image/*`
    #[error("only image files are allowed")]
    NotAnImage,

    /// No account with the supplied username
    #[error("user not found")]
    UserNotFound,

    /// No committed object under the requested id
    #[error("avatar not found")]
    NotFound,

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a completed upload.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub object_id: Uuid,
    pub url: String,
}

/// Streams avatar content into the blob store and links it to accounts.
pub struct AvatarPipeline {
    blobs: Arc<dyn BlobStore>,
    users: Arc<dyn UserStore>,
    public_url: String,
}

impl AvatarPipeline {
    pub fn new(blobs: Arc<dyn BlobStore>, users: Arc<dyn UserStore>, public_url: String) -> Self {
        Self {
            blobs,
            users,
            public_url,
        }
    }

    /// Retrieval URL for a committed object.
    pub fn url_for(&self, object_id: Uuid) -> String {
        format!("{}/api/users/avatar/{}", self.public_url, object_id)
    }

    /// Phase one: validate and stream the payload into the blob store.
    ///
    /// The cap is enforced on the running total as fragments arrive, so an
    /// oversized upload is rejected before finalize and leaves nothing
    /// readable behind. Returns the committed object id.
    pub async fn store_stream<S, E>(
        &self,
        file_name: &str,
        content_type: &str,
        stream: S,
    ) -> Result<Uuid, AvatarError>
    where
        S: Stream<Item = Result<bytes::Bytes, E>> + Send,
        E: Display,
    {
        futures_util::pin_mut!(stream);

        if !content_type.starts_with("image/") {
            tracing::warn!(content_type = %content_type, "avatar upload rejected: not an image");
            return Err(AvatarError::NotAnImage);
        }

        let stored_name = format!("{}-{}", Utc::now().timestamp_millis(), file_name);
        let mut metadata = HashMap::new();
        metadata.insert("contentType".to_string(), content_type.to_string());
        // Owner unknown until the username field arrives; patched in phase two.
        metadata.insert("username".to_string(), "pending".to_string());

        let mut writer = self
            .blobs
            .open_write(&stored_name, content_type, metadata)
            .await?;

        let mut total: u64 = 0;
        while let Some(fragment) = stream.next().await {
            let fragment = match fragment {
                Ok(bytes) => bytes,
                Err(e) => {
                    writer.abort().await?;
                    return Err(AvatarError::Blob(BlobError::Backend(format!(
                        "upload stream failed: {e}"
                    ))));
                }
            };

            total += fragment.len() as u64;
            if total > MAX_AVATAR_BYTES {
                writer.abort().await?;
                tracing::warn!(size = total, "avatar upload rejected: over size cap");
                return Err(AvatarError::Blob(BlobError::TooLarge {
                    size: total,
                    max: MAX_AVATAR_BYTES,
                }));
            }

            if let Err(e) = writer.write(&fragment).await {
                writer.abort().await?;
                return Err(AvatarError::Blob(e));
            }
        }

        let object_id = writer.finalize().await?;
        tracing::info!(object_id = %object_id, size = total, "avatar stored");
        Ok(object_id)
    }

    /// Phase two: attach ownership to a committed object and update the
    /// account's avatar reference.
    ///
    /// The metadata merge is best-effort: the object is already committed,
    /// so a metadata failure is logged and swallowed. An unknown username
    /// deletes the freshly stored object before reporting not-found, so no
    /// unreachable blob is left behind.
    pub async fn attach_to_account(
        &self,
        username: &str,
        object_id: Uuid,
    ) -> Result<AvatarUpload, AvatarError> {
        let Some(mut account) = self.users.find_by_username(username).await? else {
            if let Err(e) = self.blobs.delete(object_id).await {
                tracing::warn!(object_id = %object_id, error = %e, "failed to delete unclaimed avatar");
            }
            return Err(AvatarError::UserNotFound);
        };

        let mut patch = HashMap::new();
        patch.insert("username".to_string(), username.to_string());
        patch.insert("updatedAt".to_string(), Utc::now().to_rfc3339());
        if let Err(e) = self.blobs.update_metadata(object_id, patch).await {
            tracing::warn!(object_id = %object_id, error = %e, "avatar metadata attach failed");
        }

        let url = self.url_for(object_id);
        account.avatar = Some(url.clone());
        self.users.update(&account).await?;

        tracing::info!(username = %username, object_id = %object_id, "avatar linked to account");
        Ok(AvatarUpload { object_id, url })
    }

    /// Both phases, for callers that already hold the username.
    pub async fn upload<S, E>(
        &self,
        username: &str,
        file_name: &str,
        content_type: &str,
        stream: S,
    ) -> Result<AvatarUpload, AvatarError>
    where
        S: Stream<Item = Result<bytes::Bytes, E>> + Send,
        E: Display,
    {
        let object_id = self.store_stream(file_name, content_type, stream).await?;
        self.attach_to_account(username, object_id).await
    }

    /// Remove a stored object that ended up with no owner to claim it.
    pub async fn discard(&self, object_id: Uuid) {
        if let Err(e) = self.blobs.delete(object_id).await {
            tracing::warn!(object_id = %object_id, error = %e, "failed to discard unclaimed avatar");
        }
    }

    /// Resolve a committed object for streaming.
    pub async fn fetch(&self, object_id: Uuid) -> Result<BlobRead, AvatarError> {
        self.blobs.open_read(object_id).await.map_err(|e| match e {
            BlobError::NotFound(_) => AvatarError::NotFound,
            other => AvatarError::Blob(other),
        })
    }
}
