//! Avatar API integration tests
//!
//! Multipart upload through the full router, streamed download with
//! headers, and the rejection paths (missing fields, wrong content type,
//! size cap, unknown user).

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use common::{create_test_app, register_user};
use pretty_assertions::assert_eq;
use staffdesk::users::UserStore;

fn png_part(bytes: Vec<u8>) -> Part {
    Part::bytes(bytes).file_name("me.png").mime_type("image/png")
}

#[tokio::test]
async fn test_upload_and_fetch_round_trip() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let payload = b"fake png bytes".to_vec();
    let form = MultipartForm::new()
        .add_text("username", "alice")
        .add_part("avatar", png_part(payload.clone()));

    let response = app.server.post("/api/users/upload-avatar").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    let file_id = body["fileId"].as_str().expect("fileId");
    let avatar_url = body["avatarUrl"].as_str().expect("avatarUrl");
    assert!(avatar_url.ends_with(file_id));
    assert_eq!(body["filename"], "me.png");

    // The account now points at the retrieval URL.
    let account = app.users.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(account.avatar.as_deref(), Some(avatar_url));

    // Stream it back with headers from the stored index entry.
    let fetched = app
        .server
        .get(&format!("/api/users/avatar/{file_id}"))
        .await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    assert_eq!(
        fetched.headers().get("content-type").unwrap(),
        "image/png"
    );
    assert_eq!(
        fetched.headers().get("content-length").unwrap(),
        &payload.len().to_string()
    );
    assert_eq!(fetched.as_bytes().as_ref(), payload.as_slice());
}

#[tokio::test]
async fn test_upload_attaches_owner_metadata() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let form = MultipartForm::new()
        .add_text("username", "alice")
        .add_part("avatar", png_part(b"bytes".to_vec()));
    let response = app.server.post("/api/users/upload-avatar").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let ids = app.blobs.list();
    assert_eq!(ids.len(), 1);
    use staffdesk::storage::BlobStore;
    let read = app.blobs.open_read(ids[0]).await.unwrap();
    assert_eq!(read.object.metadata.get("username").unwrap(), "alice");
    assert!(read.object.metadata.contains_key("updatedAt"));
}

#[tokio::test]
async fn test_upload_file_before_username_field() {
    // Multipart fields arrive in client order; the file may precede the
    // username. Attachment still happens once the loop has seen both.
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let form = MultipartForm::new()
        .add_part("avatar", png_part(b"bytes first".to_vec()))
        .add_text("username", "alice");

    let response = app.server.post("/api/users/upload-avatar").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let account = app.users.find_by_username("alice").await.unwrap().unwrap();
    assert!(account.avatar.is_some());
}

#[tokio::test]
async fn test_upload_missing_username_discards_object() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let form = MultipartForm::new().add_part("avatar", png_part(b"orphan".to_vec()));
    let response = app.server.post("/api/users/upload-avatar").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Missing avatar or username.");
    assert!(app.blobs.list().is_empty());
}

#[tokio::test]
async fn test_upload_missing_file_rejected() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let form = MultipartForm::new().add_text("username", "alice");
    let response = app.server.post("/api/users/upload-avatar").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_non_image_rejected() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let form = MultipartForm::new().add_text("username", "alice").add_part(
        "avatar",
        Part::bytes(b"just text".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );
    let response = app.server.post("/api/users/upload-avatar").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.blobs.list().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_rejected_and_nothing_readable() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    // 6 MiB, over the 5 MiB cap.
    let form = MultipartForm::new()
        .add_text("username", "alice")
        .add_part("avatar", png_part(vec![0u8; 6 * 1024 * 1024]));
    let response = app.server.post("/api/users/upload-avatar").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    // No object index entry was created anywhere.
    assert!(app.blobs.list().is_empty());

    let account = app.users.find_by_username("alice").await.unwrap().unwrap();
    assert!(account.avatar.is_none());
}

#[tokio::test]
async fn test_upload_for_unknown_user_discards_object() {
    let app = create_test_app();

    let form = MultipartForm::new()
        .add_text("username", "nobody")
        .add_part("avatar", png_part(b"bytes".to_vec()));
    let response = app.server.post("/api/users/upload-avatar").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(app.blobs.list().is_empty());
}

#[tokio::test]
async fn test_fetch_unknown_avatar_is_not_found() {
    let app = create_test_app();

    let response = app
        .server
        .get(&format!("/api/users/avatar/{}", uuid::Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_fetch_with_malformed_id_is_client_error() {
    let app = create_test_app();
    let response = app.server.get("/api/users/avatar/not-a-uuid").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
