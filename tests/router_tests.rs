//! In-process router tests.
//!
//! Every test builds its own state pointing at a closed loopback port, so
//! the database is genuinely unreachable: these exercise the auth gates
//! and the degraded-database behavior end to end without a MySQL server.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use atelier::auth::JwtManager;
use atelier::config::DbConfig;
use atelier::db::Db;
use atelier::router::{AtelierState, atelier_router};

const TEST_SECRET: &str = "router-test-secret";

fn unreachable_state() -> (AtelierState, Arc<JwtManager>) {
    let db = Arc::new(Db::new(DbConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        acquire_timeout_secs: 1,
        ..DbConfig::default()
    }));
    let jwt = Arc::new(JwtManager::new(TEST_SECRET.to_string(), 24));
    (AtelierState::new(db, jwt.clone()), jwt)
}

fn app() -> Router {
    atelier_router(unreachable_state().0)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.oneshot(req).await.expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body = String::from_utf8(bytes.to_vec()).expect("response body was not utf-8");
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .expect("failed to build request")
}

#[tokio::test]
async fn health_reports_disconnected_database() {
    let (status, body) = send(app(), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":true"#));
    assert!(body.contains(r#""database":"disconnected""#));
}

#[tokio::test]
async fn public_projects_degrade_to_empty_list() {
    let (status, body) = send(app(), get("/api/projects")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":true"#));
    assert!(body.contains(r#""data":[]"#));
}

#[tokio::test]
async fn site_status_answers_with_defaults_when_degraded() {
    let (status, body) = send(app(), get("/api/site-status")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""maintenance_mode":"disabled""#));
    assert!(body.contains(r#""database_connected":false"#));
}

#[tokio::test]
async fn admin_routes_require_a_bearer_token() {
    let (status, body) = send(app(), get("/api/admin/projects")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains(r#""success":false"#));
    assert!(body.contains("missing bearer token"));
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let req = Request::builder()
        .method("GET")
        .uri("/api/admin/projects")
        .header("authorization", "Bearer not-a-real-token")
        .body(Body::empty())
        .expect("failed to build request");
    let (status, _) = send(app(), req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_reaches_the_handler_and_reports_unavailable() {
    let (state, jwt) = unreachable_state();
    let token = jwt.issue(1, "admin", "admin").expect("failed to issue token");

    let req = Request::builder()
        .method("GET")
        .uri("/api/admin/projects")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("failed to build request");
    let (status, body) = send(atelier_router(state), req).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("database unavailable"));
}

#[tokio::test]
async fn login_requires_credentials() {
    let (status, _) = send(
        app(),
        post_json("/api/admin/login", r#"{"username": "", "password": ""}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_unreachable_database_returns_503() {
    let (status, body) = send(
        app(),
        post_json(
            "/api/admin/login",
            r#"{"username": "admin", "password": "whatever"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains(r#""success":false"#));
}

#[tokio::test]
async fn inquiry_rejects_missing_fields() {
    let (status, body) = send(
        app(),
        post_json("/api/project-request", r#"{"name": "Visitor"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("field `email` is required"));
}

#[tokio::test]
async fn inquiry_with_unreachable_database_returns_503() {
    let payload = r#"{
        "name": "Visitor",
        "email": "visitor@example.com",
        "description": "A new marketing site"
    }"#;
    let (status, _) = send(app(), post_json("/api/project-request", payload)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn repair_requires_authentication() {
    let (status, _) = send(app(), post_json("/api/admin/repair-database", "{}")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_repair_fails_gracefully_when_database_stays_down() {
    let (state, jwt) = unreachable_state();
    let token = jwt.issue(1, "admin", "admin").expect("failed to issue token");

    let req = Request::builder()
        .method("POST")
        .uri("/api/admin/repair-database")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("failed to build request");
    let (status, _) = send(atelier_router(state), req).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
