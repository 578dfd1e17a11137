//! Authentication API integration tests
//!
//! Drives the full router over in-memory stores: registration, login,
//! the gated change-password flow, and the forgot/reset round trip.

mod common;

use axum::http::StatusCode;
use common::{create_test_app, register_user, TEST_SECRET};
use pretty_assertions::assert_eq;
use staffdesk::auth::Claims;
use staffdesk::users::Role;
use staffdesk::users::UserStore;

#[tokio::test]
async fn test_register_success_stores_hash_not_plaintext() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/auth/register")
        .json(&serde_json::json!({
            "username": "alice",
            "email": "a@x.com",
            "password": "secret1",
            "role": "user"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let text = response.text();
    assert!(!text.contains("secret1"), "plaintext leaked into response");

    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["token"].as_str().is_some());

    let account = app
        .users
        .find_by_username("alice")
        .await
        .unwrap()
        .expect("account persisted");
    assert_ne!(account.password_hash, "secret1");
    assert!(account.password_hash.starts_with("$2"));
}

#[tokio::test]
async fn test_register_unknown_role_rejected() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/auth/register")
        .json(&serde_json::json!({
            "username": "alice",
            "email": "a@x.com",
            "password": "secret1",
            "role": "superadmin"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.users.find_by_username("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_register_viewer_role_accepted() {
    let app = create_test_app();
    register_user(&app.server, "eve", "e@x.com", "secret1", "viewer").await;

    let account = app.users.find_by_username("eve").await.unwrap().unwrap();
    assert_eq!(account.role, Role::Viewer);
}

#[tokio::test]
async fn test_register_duplicate_email_conflict() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&serde_json::json!({
            "username": "alice2",
            "email": "a@x.com",
            "password": "secret1",
            "role": "user"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_duplicate_username_conflict() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&serde_json::json!({
            "username": "alice",
            "email": "other@x.com",
            "password": "secret1",
            "role": "user"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_by_username_and_by_email() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    for identifier in ["alice", "a@x.com"] {
        let response = app
            .server
            .post("/api/auth/login")
            .json(&serde_json::json!({
                "usernameOrEmail": identifier,
                "password": "secret1"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["username"], "alice");
        assert_eq!(body["role"], "user");
        assert!(body["token"].as_str().is_some());
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let wrong_password = app
        .server
        .post("/api/auth/login")
        .json(&serde_json::json!({
            "usernameOrEmail": "alice",
            "password": "wrong"
        }))
        .await;

    let unknown_user = app
        .server
        .post("/api/auth/login")
        .json(&serde_json::json!({
            "usernameOrEmail": "mallory",
            "password": "secret1"
        }))
        .await;

    assert_eq!(wrong_password.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_user.status_code(), StatusCode::BAD_REQUEST);
    // Byte-identical bodies: no account-enumeration oracle.
    assert_eq!(wrong_password.text(), unknown_user.text());
}

#[tokio::test]
async fn test_change_password_requires_token() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let response = app
        .server
        .post("/api/auth/change-password")
        .json(&serde_json::json!({
            "currentPassword": "secret1",
            "newPassword": "secret2",
            "usernameOrEmail": "alice"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_rejects_expired_token() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    // Token signed with the right secret but already expired.
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = Claims {
        sub: uuid::Uuid::new_v4().to_string(),
        username: "alice".to_string(),
        role: Role::User,
        exp: now - 10,
        iat: now - 3700,
    };
    let stale = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let response = app
        .server
        .post("/api/auth/change-password")
        .add_header("Authorization", &format!("Bearer {stale}"))
        .json(&serde_json::json!({
            "currentPassword": "secret1",
            "newPassword": "secret2",
            "usernameOrEmail": "alice"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert!(
        body["error"].as_str().unwrap().contains("expired"),
        "expiry should be reported distinctly: {body}"
    );
}

#[tokio::test]
async fn test_change_password_wrong_current_password() {
    let app = create_test_app();
    let token = register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let response = app
        .server
        .post("/api/auth/change-password")
        .add_header("Authorization", &format!("Bearer {token}"))
        .json(&serde_json::json!({
            "currentPassword": "not-my-password",
            "newPassword": "secret2",
            "usernameOrEmail": "alice"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Incorrect current password");

    // Password unchanged: the old one still logs in.
    let login = app
        .server
        .post("/api/auth/login")
        .json(&serde_json::json!({
            "usernameOrEmail": "alice",
            "password": "secret1"
        }))
        .await;
    assert_eq!(login.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_success() {
    let app = create_test_app();
    let token = register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let response = app
        .server
        .post("/api/auth/change-password")
        .add_header("Authorization", &format!("Bearer {token}"))
        .json(&serde_json::json!({
            "currentPassword": "secret1",
            "newPassword": "secret2",
            "usernameOrEmail": "alice"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let old = app
        .server
        .post("/api/auth/login")
        .json(&serde_json::json!({
            "usernameOrEmail": "alice",
            "password": "secret1"
        }))
        .await;
    assert_eq!(old.status_code(), StatusCode::BAD_REQUEST);

    let new = app
        .server
        .post("/api/auth/login")
        .json(&serde_json::json!({
            "usernameOrEmail": "alice",
            "password": "secret2"
        }))
        .await;
    assert_eq!(new.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/auth/forgot-password")
        .json(&serde_json::json!({ "email": "nobody@x.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(app.mailer.sent().is_empty());
}

/// Pull the reset token out of the mailed recovery link.
fn token_from_email(body: &str) -> String {
    let marker = "/reset-password/";
    let start = body.find(marker).expect("reset link in email") + marker.len();
    let rest = &body[start..];
    let end = rest.find('"').unwrap_or(rest.len());
    rest[..end].to_string()
}

#[tokio::test]
async fn test_forgot_then_reset_round_trip() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let response = app
        .server
        .post("/api/auth/forgot-password")
        .json(&serde_json::json!({ "email": "a@x.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@x.com");
    let token = token_from_email(&sent[0].html_body);
    assert_eq!(token.len(), 64);

    let reset = app
        .server
        .post("/api/auth/reset-password")
        .json(&serde_json::json!({
            "token": token,
            "newPassword": "brand-new"
        }))
        .await;
    assert_eq!(reset.status_code(), StatusCode::OK);

    let login = app
        .server
        .post("/api/auth/login")
        .json(&serde_json::json!({
            "usernameOrEmail": "alice",
            "password": "brand-new"
        }))
        .await;
    assert_eq!(login.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_reset_token_cannot_be_reused() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    app.server
        .post("/api/auth/forgot-password")
        .json(&serde_json::json!({ "email": "a@x.com" }))
        .await;
    let token = token_from_email(&app.mailer.sent()[0].html_body);

    let first = app
        .server
        .post("/api/auth/reset-password")
        .json(&serde_json::json!({ "token": token, "newPassword": "pw-one" }))
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let second = app
        .server
        .post("/api/auth/reset-password")
        .json(&serde_json::json!({ "token": token, "newPassword": "pw-two" }))
        .await;
    assert_eq!(second.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = second.json();
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_reset_with_wrong_token_same_message_as_expired() {
    let app = create_test_app();
    register_user(&app.server, "alice", "a@x.com", "secret1", "user").await;

    let response = app
        .server
        .post("/api/auth/reset-password")
        .json(&serde_json::json!({
            "token": "deadbeef",
            "newPassword": "whatever"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}
