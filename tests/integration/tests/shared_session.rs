//! Shared session resolution against real backends.

use reqwest::StatusCode;
use sb_integration_tests::{delete_user, insert_user};
use sb_session::record::{AUTH_HASH_KEY, AUTH_USER_ID_KEY, CACHED_EMAIL_KEY, CACHED_USERNAME_KEY};
use sb_session::SessionRecord;
use serde_json::{json, Value};

use crate::common::TestEnv;

/// Pickle protocol 4 bytes produced by the Identity Service for
/// `{'_auth_user_id': '1', '_auth_user_username': 'alice', '_auth_user_email': 'a@example.com'}`.
const ALICE_PICKLE: &str = "gASVWgAAAAAAAAB9lCiMDV9hdXRoX3VzZXJfaWSUjAExlIwTX2F1dGhfdXNlcl91c2VybmFtZZSMBWFsaWNllIwQX2F1dGhfdXNlcl9lbWFpbJSMDWFAZXhhbXBsZS5jb22UdS4=";

fn login_record(id: i64, username: &str, email: &str) -> SessionRecord {
    SessionRecord::new()
        .with(AUTH_USER_ID_KEY, id.to_string())
        .with(CACHED_USERNAME_KEY, username)
        .with(CACHED_EMAIL_KEY, email)
}

#[tokio::test]
async fn test_user_resolved_from_directory() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let id = insert_user(&env.pool, "alice", Some("alice@example.com")).await?;
    env.sessions
        .login("abc123", &login_record(id, "alice-cached", "cached@example.com"))
        .await?;

    let response = env.get("/api/user", Some("abc123")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(
        body,
        json!({
            "id": id,
            "username": "alice",
            "email": "alice@example.com",
            "session_id": "abc123",
            "auth_backend": "directory",
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_user_falls_back_to_session_cache() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let id = insert_user(&env.pool, "alice", Some("a@example.com")).await?;
    env.sessions
        .login("abc123", &login_record(id, "alice", "a@example.com"))
        .await?;
    delete_user(&env.pool, id).await?;

    let response = env.get("/api/user", Some("abc123")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body["id"], id);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["auth_backend"], "session-cache");
    Ok(())
}

#[tokio::test]
async fn test_identity_service_pickle_is_understood() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let id = insert_user(&env.pool, "alice", Some("a@example.com")).await?;
    assert_eq!(id, 1, "fresh table should hand out id 1");
    env.sessions
        .write_raw("abc123", ALICE_PICKLE.to_string())
        .await?;

    let body: Value = env.get("/api/user", Some("abc123")).await?.json().await?;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["auth_backend"], "directory");
    Ok(())
}

#[tokio::test]
async fn test_null_email_maps_to_empty_string() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let id = insert_user(&env.pool, "bob", None).await?;
    env.sessions
        .login("abc123", &SessionRecord::new().with(AUTH_USER_ID_KEY, id))
        .await?;

    let body: Value = env.get("/api/user", Some("abc123")).await?.json().await?;
    assert_eq!(body["username"], "bob");
    assert_eq!(body["email"], "");
    Ok(())
}

#[tokio::test]
async fn test_anonymous_requests() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.sessions
        .write_raw("corrupt", "this is not a session".to_string())
        .await?;

    for session_id in [None, Some("unknown"), Some("corrupt")] {
        let response = env.get("/api/user", session_id).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{session_id:?}");
        let body: Value = response.json().await?;
        assert_eq!(body["error"], "unauthorized");
    }

    let body: Value = env.get("/api/session", None).await?.json().await?;
    assert_eq!(body, json!({"session": null}));
    Ok(())
}

#[tokio::test]
async fn test_logout_ends_shared_session() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let id = insert_user(&env.pool, "alice", Some("a@example.com")).await?;
    env.sessions
        .login("abc123", &login_record(id, "alice", "a@example.com"))
        .await?;

    let response = env.get("/api/user", Some("abc123")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    env.sessions.logout("abc123").await?;

    let response = env.get("/api/user", Some("abc123")).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_session_data_hides_sensitive_keys() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let record = login_record(1, "alice", "a@example.com")
        .with(AUTH_HASH_KEY, "deadbeef")
        .with("cart", json!([1, 2, 3]));
    env.sessions.login("abc123", &record).await?;

    let body: Value = env.get("/api/session", Some("abc123")).await?.json().await?;
    assert_eq!(body["session_id"], "abc123");
    assert_eq!(body["session_data"]["cart"], json!([1, 2, 3]));
    assert_eq!(body["session_data"][AUTH_USER_ID_KEY], "1");
    assert!(body["session_data"].get(AUTH_HASH_KEY).is_none());
    Ok(())
}

#[tokio::test]
async fn test_health_endpoints() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let response = env.get("/health", None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(
        body,
        json!({"status": "healthy", "store": "ok", "directory": "ok"})
    );

    for path in ["/health/live", "/health/ready"] {
        let response = env.get(path, None).await?;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }
    Ok(())
}
