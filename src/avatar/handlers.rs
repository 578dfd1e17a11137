/**
 * Avatar Handlers
 *
 * `POST /api/users/upload-avatar` - multipart upload. Fields arrive in
 * client order, so the file stream is ingested the moment it appears
 * (phase one) and account attachment happens after the loop, once the
 * `username` field has also been seen (phase two). A stored file with no
 * username to claim it is discarded before the 400 goes out.
 *
 * `GET /api/users/avatar/{id}` - streams the committed object with
 * Content-Type and Content-Length taken from the stored index entry. A
 * mid-stream read failure terminates the response; it is never silently
 * truncated into a "successful" short body.
 */

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    response::{Json, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::avatar::pipeline::AvatarPipeline;
use crate::error::ApiError;

/// Upload response.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUploadResponse {
    pub avatar_url: String,
    pub file_id: String,
    pub filename: String,
    pub message: String,
}

pub async fn upload_avatar(
    State(pipeline): State<Arc<AvatarPipeline>>,
    mut multipart: Multipart,
) -> Result<Json<AvatarUploadResponse>, ApiError> {
    let mut username: Option<String> = None;
    let mut stored: Option<(Uuid, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("username") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("Invalid username field: {e}")))?;
                username = Some(value);
            }
            Some("avatar") if stored.is_none() => {
                let file_name = field.file_name().unwrap_or("avatar").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                // Phase one: the file is streamed into the blob store as it
                // arrives; the owner may not be known yet.
                let object_id = match pipeline
                    .store_stream(&file_name, &content_type, field)
                    .await
                {
                    Ok(id) => id,
                    Err(e) => return Err(e.into()),
                };
                stored = Some((object_id, file_name));
            }
            _ => {
                // Unrecognized or repeated field; dropping it drains it.
            }
        }
    }

    let (object_id, filename) = match stored {
        Some(stored) => stored,
        None => return Err(ApiError::validation("Missing avatar or username.")),
    };

    let username = match username {
        Some(username) if !username.is_empty() => username,
        _ => {
            // The file went in before we learned there is no owner field.
            pipeline.discard(object_id).await;
            return Err(ApiError::validation("Missing avatar or username."));
        }
    };

    // Phase two: metadata enrichment and account linkage.
    let upload = pipeline.attach_to_account(&username, object_id).await?;

    Ok(Json(AvatarUploadResponse {
        avatar_url: upload.url,
        file_id: upload.object_id.to_string(),
        filename,
        message: "Avatar uploaded successfully.".to_string(),
    }))
}

pub async fn get_avatar(
    State(pipeline): State<Arc<AvatarPipeline>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let read = pipeline.fetch(id).await?;

    let content_type = read
        .object
        .metadata
        .get("contentType")
        .cloned()
        .unwrap_or_else(|| read.object.content_type.clone());

    Response::builder()
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, read.object.length.to_string())
        .body(Body::from_stream(read.stream))
        .map_err(|e| ApiError::internal(format!("failed to build avatar response: {e}")))
}
