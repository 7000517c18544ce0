//! Integration tests for event management and the deletion cascade.
//!
//! Run with: cargo test --test events_integration

mod common;

use axum::http::{Method, StatusCode};
use common::{
    admin_token, authed_json_request, authed_request, parse_response_body, random_email,
    register_and_login, test_app,
};
use serde_json::{json, Value};

async fn create_event(app: &common::TestApp, token: &str, title: &str) -> Value {
    let response = app
        .request(authed_json_request(
            Method::POST,
            "/api/v1/events",
            token,
            json!({
                "title": title,
                "event_date": "2024-01-15",
                "start_time": "08:00:00",
                "end_time": "17:00:00",
                "location": "Gymnasium"
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    parse_response_body(response).await
}

#[tokio::test]
async fn test_admin_creates_and_lists_events() {
    let app = test_app();
    let admin = admin_token("1");
    create_event(&app, &admin, "Orientation").await;

    let (student, _) = register_and_login(&app, &random_email()).await;
    let response = app
        .request(authed_request(Method::GET, "/api/v1/events", &student))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Orientation");
    assert_eq!(body[0]["status"], "active");
}

#[tokio::test]
async fn test_student_cannot_create_events() {
    let app = test_app();
    let (student, _) = register_and_login(&app, &random_email()).await;

    let response = app
        .request(authed_json_request(
            Method::POST,
            "/api/v1/events",
            &student,
            json!({"title": "Rogue Event", "event_date": "2024-01-15"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_rejects_malformed_date() {
    let app = test_app();
    let admin = admin_token("1");

    let response = app
        .request(authed_json_request(
            Method::POST,
            "/api/v1/events",
            &admin,
            json!({"title": "Orientation", "event_date": "Jan 15, 2024"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_cascades_to_attendance() {
    let app = test_app();
    let admin = admin_token("1");
    let event = create_event(&app, &admin, "Orientation").await;
    let other = create_event(&app, &admin, "Sports Fest").await;

    use persistence::store::RowStore;
    for event_id in [&event["id"], &event["id"], &event["id"], &other["id"]] {
        app.primary
            .insert(
                "attendance_records",
                json!({"user_id": 5, "event_id": event_id, "attendance_type": "check_in"}),
            )
            .await
            .unwrap();
    }

    let uri = format!("/api/v1/events/{}", event["id"]);
    let response = app.request(authed_request(Method::DELETE, &uri, &admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["deleted"], true);
    assert_eq!(body["attendance_deleted"], 3);

    // The other event and its scan survive.
    assert_eq!(app.primary.row_count("events").await, 1);
    assert_eq!(app.primary.row_count("attendance_records").await, 1);
}

#[tokio::test]
async fn test_delete_unknown_event_is_404_without_side_effects() {
    let app = test_app();
    let admin = admin_token("1");
    create_event(&app, &admin, "Orientation").await;

    let response = app
        .request(authed_request(Method::DELETE, "/api/v1/events/999", &admin))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.primary.row_count("events").await, 1);
}

#[tokio::test]
async fn test_admin_resync_recovers_missed_replication() {
    let app = test_app();
    app.secondary.poison("users").await;
    let (_, user) = register_and_login(&app, &random_email()).await;
    app.secondary.heal("users").await;
    assert_eq!(app.secondary.row_count("users").await, 0);

    let admin = admin_token("1");
    let uri = format!("/api/v1/admin/users/{}/resync", user["id"]);
    let response = app.request(authed_request(Method::POST, &uri, &admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["sync"]["synced"], true);
    assert_eq!(app.secondary.row_count("users").await, 1);

    // Repeating the resync overwrites rather than duplicates.
    let response = app.request(authed_request(Method::POST, &uri, &admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.secondary.row_count("users").await, 1);
}

#[tokio::test]
async fn test_resync_unknown_user_reports_failure() {
    let app = test_app();
    let admin = admin_token("1");

    let response = app
        .request(authed_request(
            Method::POST,
            "/api/v1/admin/users/999/resync",
            &admin,
        ))
        .await;
    // The request itself succeeds; the outcome reports the miss.
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["sync"]["synced"], false);
}
