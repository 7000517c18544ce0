//! Common test utilities for integration tests.
//!
//! The router is built over in-memory stores, so the tests exercise the
//! full HTTP stack without either backend database.

// Allow dead code in this module - these helpers are shared across the
// integration test binaries and not every binary uses all of them.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use serde_json::Value;
use tower::ServiceExt;

use attendance_api::{app::create_app, config::Config};
use persistence::memory::{IdMode, MemoryStore};
use shared::jwt::JwtConfig;

pub const TEST_SECRET: &str = "test-secret-not-for-production";

/// A test harness: the router plus direct handles to both stores.
pub struct TestApp {
    pub app: Router,
    pub primary: Arc<MemoryStore>,
    pub secondary: Arc<MemoryStore>,
}

impl TestApp {
    /// Sends one request through a clone of the router.
    pub async fn request(&self, request: Request<Body>) -> axum::response::Response {
        self.app.clone().oneshot(request).await.unwrap()
    }
}

/// Builds the app over fresh in-memory stores with the default test config.
pub fn test_app() -> TestApp {
    test_app_with(&[])
}

/// Builds the app with config overrides, e.g. `("stores.dual_sync", "false")`.
pub fn test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let config = Config::load_for_test(overrides).expect("Failed to load test config");
    let primary = Arc::new(MemoryStore::new(IdMode::Sequence));
    let secondary = Arc::new(MemoryStore::new(IdMode::UuidV4));
    let app = create_app(config, primary.clone(), secondary.clone());
    TestApp {
        app,
        primary,
        secondary,
    }
}

/// A random plausible email for tests that don't assert on the address.
pub fn random_email() -> String {
    SafeEmail().fake()
}

/// Helper to create a JSON request.
pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Helper to create an authorized JSON request.
pub fn authed_json_request(
    method: Method,
    uri: &str,
    token: &str,
    body: Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Helper to create an authorized request without a body.
pub fn authed_request(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Helper to read a response body as text (for CSV downloads).
pub async fn response_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Registers a student through the API and returns a session token plus
/// the new user id.
pub async fn register_and_login(app: &TestApp, email: &str) -> (String, Value) {
    let register = json_request(
        Method::POST,
        "/api/v1/auth/register",
        serde_json::json!({
            "email": email,
            "password": "correct-horse-battery",
            "first_name": "Ana",
            "last_name": "Cruz",
            "course": "BSIT",
            "year_level": 3,
            "section": "3A"
        }),
    );
    let response = app.request(register).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let user = parse_response_body(response).await;

    let login = json_request(
        Method::POST,
        "/api/v1/auth/login",
        serde_json::json!({"email": email, "password": "correct-horse-battery"}),
    );
    let response = app.request(login).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = parse_response_body(response).await;

    (body["token"].as_str().unwrap().to_string(), user)
}

/// Mints an admin session token directly, bypassing the login flow.
/// The subject does not need to exist for routes that only check the role.
pub fn admin_token(user_id: &str) -> String {
    JwtConfig::new(TEST_SECRET, 3600)
        .issue_token(user_id, "admin")
        .unwrap()
}

/// Mints a student session token directly.
pub fn student_token(user_id: &str) -> String {
    JwtConfig::new(TEST_SECRET, 3600)
        .issue_token(user_id, "student")
        .unwrap()
}
