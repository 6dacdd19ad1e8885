#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use bookshelf_api::auth::jwt::JwtConfig;
use bookshelf_api::config::{AuditConfig, ServerConfig};
use bookshelf_api::router::build_app_router;
use bookshelf_api::state::{AppState, Repositories};
use bookshelf_db::memory::MemoryStore;
use bookshelf_events::RecordingAuditClient;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            refresh_token_ttl_days: 30,
        },
        password_salt: "salt".to_string(),
        audit: AuditConfig {
            url: None,
            timeout_secs: 5,
        },
        books_require_auth: true,
        session_cleanup_interval_secs: 0,
    }
}

/// The router plus handles onto its in-memory backends.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub audit: RecordingAuditClient,
}

impl TestApp {
    /// A fresh clone of the router for one `oneshot` call.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over an in-memory store.
///
/// Uses [`build_app_router`], so tests exercise the production middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery, cancellation).
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let store = MemoryStore::new();
    let audit = RecordingAuditClient::new();
    let state = AppState::new(
        config,
        Repositories::memory(&store),
        Arc::new(audit.clone()),
        None,
    );

    TestApp {
        router: build_app_router(state),
        store,
        audit,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, body, None)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, json_request(Method::POST, uri, body, Some(token))).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, json_request(Method::PUT, uri, body, Some(token))).await
}

/// POST /auth/refresh with the given cookie value.
pub async fn refresh_with_cookie(app: Router, refresh_token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/refresh")
        .header(COOKIE, format!("refresh-token={refresh_token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Read the response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Value of the `refresh-token` cookie set by the response.
pub fn refresh_cookie(response: &Response) -> String {
    let header = response
        .headers()
        .get(SET_COOKIE)
        .expect("response must set a cookie")
        .to_str()
        .unwrap();
    assert!(header.contains("HttpOnly"), "refresh cookie must be HttpOnly");
    header
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("refresh-token="))
        .expect("cookie must be refresh-token")
        .to_string()
}

// ---------------------------------------------------------------------------
// Flow helpers
// ---------------------------------------------------------------------------

pub async fn sign_up(app: Router, email: &str, password: &str) -> Response {
    post_json(
        app,
        "/auth/sign-up",
        serde_json::json!({ "name": "A", "email": email, "password": password }),
    )
    .await
}

/// Sign in and return `(access_token, refresh_token)`.
pub async fn sign_in(app: Router, email: &str, password: &str) -> (String, String) {
    let response = post_json(
        app,
        "/auth/sign-in",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let refresh = refresh_cookie(&response);
    let json = body_json(response).await;
    let access = json["token"].as_str().expect("body must carry token").to_string();
    (access, refresh)
}

/// Register a user and sign them in, returning the access token.
pub async fn signed_in_token(app: &TestApp) -> String {
    let response = sign_up(app.app(), "reader@example.com", "pw").await;
    assert_eq!(response.status(), StatusCode::OK);
    sign_in(app.app(), "reader@example.com", "pw").await.0
}
