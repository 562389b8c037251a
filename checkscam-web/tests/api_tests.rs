//! Integration tests for checkscam-web API endpoints
//!
//! Tests run against the full router with an in-memory database and an
//! unconfigured phone-check service (no provider keys), so no network
//! traffic is ever issued. Searches pass oracle=0 to keep the generative
//! oracle out of the loop as well.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

use checkscam_web::services::{PhoneCheckConfig, PhoneCheckService, ScamOracle};
use checkscam_web::{build_router, AppState};

/// Test helper: router over a fresh in-memory database. The TempDir must
/// outlive the router, so it is returned alongside.
async fn setup_app() -> (axum::Router, SqlitePool, TempDir) {
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    checkscam_common::db::init::create_schema(&pool).await.unwrap();
    checkscam_common::db::init::init_default_settings(&pool)
        .await
        .unwrap();

    let media_dir = TempDir::new().unwrap();

    let state = AppState::new(
        pool.clone(),
        PhoneCheckService::new(PhoneCheckConfig::default()),
        ScamOracle::new().unwrap(),
        media_dir.path().to_path_buf(),
    );

    (build_router(state), pool, media_dir)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn request_with_token(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Register a user and return its session token.
async fn register(app: &axum::Router, username: &str) -> String {
    let request = post_json(
        "/api/auth/register",
        json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password1": "correct horse",
            "password2": "correct horse",
        }),
        None,
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    body["token"].as_str().unwrap().to_string()
}

// =============================================================================
// Health endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool, _media) = setup_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "checkscam-web");
    assert!(body["version"].is_string());
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_register_login_logout_round_trip() {
    let (app, _pool, _media) = setup_app().await;

    let token = register(&app, "alice").await;
    assert!(!token.is_empty());

    // Fresh login issues a new session.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({"username": "alice", "password": "correct horse"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["is_moderator"], false);
    let login_token = body["token"].as_str().unwrap().to_string();

    // Logout invalidates the session; the protected report route now 401s.
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/logout", json!({}), Some(&login_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request_with_token("POST", "/api/report", Some(&login_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (app, _pool, _media) = setup_app().await;
    register(&app, "alice").await;

    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({"username": "alice", "password": "wrong"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation() {
    let (app, _pool, _media) = setup_app().await;

    // Mismatched passwords
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({"username": "a", "email": "a@b.com", "password1": "x", "password2": "y"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Implausible email
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({"username": "a", "email": "not-an-email", "password1": "x", "password2": "x"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Duplicate username
    register(&app, "bob").await;
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({"username": "bob", "email": "bob2@example.com", "password1": "x", "password2": "x"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_username_becomes_moderator() {
    let (app, _pool, _media) = setup_app().await;

    let request = post_json(
        "/api/auth/register",
        json!({
            "username": "admin",
            "email": "admin@example.com",
            "password1": "pw",
            "password2": "pw",
        }),
        None,
    );
    let response = app.oneshot(request).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["is_moderator"], true);
}

// =============================================================================
// Reports: submission, listing, moderation
// =============================================================================

#[tokio::test]
async fn test_post_lifecycle_create_approve_list_delete() {
    let (app, _pool, _media) = setup_app().await;
    let admin_token = register(&app, "admin").await;
    let user_token = register(&app, "carol").await;

    // Anonymous JSON submission creates a pending report.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/posts",
            json!({
                "name": "Fake web shop",
                "bank_account": "0011223344",
                "phone": "0972009161",
                "description": "Takes payment, never ships",
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = extract_json(response.into_body()).await;
    let guid = body["guid"].as_str().unwrap().to_string();

    // Pending reports are not listed publicly.
    let response = app.clone().oneshot(get("/api/posts?page=1")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_results"], 0);

    // But they show up in the moderation queue.
    let response = app
        .clone()
        .oneshot(request_with_token("GET", "/api/moderation/pending", Some(&admin_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["posts"][0]["guid"], guid.as_str());

    // The queue itself is moderator-gated.
    let response = app
        .clone()
        .oneshot(request_with_token("GET", "/api/moderation/pending", Some(&user_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Approval is moderator-only.
    let approve_uri = format!("/api/posts/{}/approve", guid);
    let response = app
        .clone()
        .oneshot(request_with_token("POST", &approve_uri, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(request_with_token("POST", &approve_uri, Some(&user_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request_with_token("POST", &approve_uri, Some(&admin_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Now it shows up in the listing and in detail.
    let response = app.clone().oneshot(get("/api/posts?page=1")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_results"], 1);
    assert_eq!(body["posts"][0]["name"], "Fake web shop");
    assert_eq!(body["page_size"], 20);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/posts/{}", guid)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["name"], "Fake web shop");
    assert!(body["images"].as_array().unwrap().is_empty());

    // Delete (moderator) removes it entirely.
    let delete_uri = format!("/api/posts/{}/delete", guid);
    let response = app
        .clone()
        .oneshot(request_with_token("POST", &delete_uri, Some(&user_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request_with_token("POST", &delete_uri, Some(&admin_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/posts/{}", guid)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_json_submission_requires_name_and_description() {
    let (app, _pool, _media) = setup_app().await;

    let response = app
        .oneshot(post_json(
            "/api/posts",
            json!({"name": "  ", "description": ""}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_multipart_report_requires_session() {
    let (app, _pool, _media) = setup_app().await;

    let response = app
        .clone()
        .oneshot(request_with_token("POST", "/api/report", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_multipart_report_submission() {
    let (app, pool, _media) = setup_app().await;
    let token = register(&app, "dave").await;

    let boundary = "X-CHECKSCAM-TEST-BOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nFake charity\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"phone\"\r\n\r\n\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nCold calls for donations\r\n\
         --{b}--\r\n",
        b = boundary
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/report")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = extract_json(response.into_body()).await;
    let guid = body["guid"].as_str().unwrap();
    assert_eq!(body["images"], 0);

    // Report lands in pending status.
    let status: String = sqlx::query_scalar("SELECT status FROM scam_posts WHERE guid = ?")
        .bind(guid)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "pending");
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_requires_query() {
    let (app, _pool, _media) = setup_app().await;

    let response = app.clone().oneshot(get("/api/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/api/search?q=%20")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_without_providers_returns_default_verdict() {
    let (app, pool, _media) = setup_app().await;

    let response = app
        .oneshot(get("/api/search?q=0999111222&oracle=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["source"], "live");
    assert_eq!(body["verdict"]["is_valid"], false);
    assert_eq!(body["verdict"]["line_type"], "Unknown");
    assert_eq!(body["verdict"]["carrier"], "Unknown");
    assert_eq!(body["verdict"]["is_suspicious"], false);
    assert_eq!(body["verdict"]["risk_level"], "Low");
    assert_eq!(body["warning"], false);
    assert!(body["post"].is_null());

    // Invalid verdicts are never persisted.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scam_posts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_search_hits_curated_list_first() {
    let (app, pool, _media) = setup_app().await;

    // Seed an approved report the way moderation would.
    sqlx::query(
        "INSERT INTO scam_posts (guid, name, phone, description, status, line_type, carrier, risk_level)
         VALUES ('seed', 'Known scammer', '0972009161', 'Documented case', 'approved', 'mobile', 'Viettel', 'High')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let response = app
        .oneshot(get("/api/search?q=0972009161&oracle=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["source"], "curated");
    assert_eq!(body["verdict"]["is_valid"], true);
    assert_eq!(body["verdict"]["line_type"], "mobile");
    assert_eq!(body["verdict"]["carrier"], "Viettel");
    assert_eq!(body["verdict"]["risk_level"], "High");
    // The stored record is the match.
    assert_eq!(body["post"]["guid"], "seed");
    assert_eq!(body["warning"], true);
}

#[tokio::test]
async fn test_search_does_not_match_pending_reports() {
    let (app, pool, _media) = setup_app().await;

    sqlx::query(
        "INSERT INTO scam_posts (guid, name, phone, description, status)
         VALUES ('p1', 'Unreviewed', '0911222333', 'awaiting moderation', 'pending')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let response = app
        .oneshot(get("/api/search?q=0911222333&oracle=0"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["source"], "live");
    assert!(body["post"].is_null());
}

// =============================================================================
// Feed import gating
// =============================================================================

#[tokio::test]
async fn test_feed_fetch_is_moderator_only() {
    let (app, _pool, _media) = setup_app().await;
    let user_token = register(&app, "erin").await;

    let response = app
        .clone()
        .oneshot(request_with_token("POST", "/api/feed/fetch", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request_with_token("POST", "/api/feed/fetch", Some(&user_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// UI assets
// =============================================================================

#[tokio::test]
async fn test_ui_assets_served() {
    let (app, _pool, _media) = setup_app().await;

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/static/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/javascript"
    );
}
