//! Event routes: listing, creation and the deletion cascade.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use domain::models::{Event, RecordId};
use shared::validation::validate_report_date;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::events::EventDeleteError;

/// Request body for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// `YYYY-MM-DD`.
    #[validate(custom(function = validate_report_date))]
    pub event_date: String,

    pub start_time: Option<String>,
    pub end_time: Option<String>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Response for a completed deletion cascade.
#[derive(Debug, Serialize)]
pub struct DeleteEventResponse {
    pub deleted: bool,
    pub attendance_deleted: u64,
}

/// List all events.
///
/// GET /api/v1/events
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.event_service().list().await?;
    Ok(Json(events))
}

/// Fetch one event by id.
///
/// GET /api/v1/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let id = RecordId::parse(&id);
    let event = state
        .event_service()
        .find(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event {} not found", id)))?;
    Ok(Json(event))
}

/// Create an event.
///
/// POST /api/v1/events (admin only)
pub async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    body.validate()?;

    let event = state
        .event_service()
        .create(json!({
            "title": body.title,
            "event_date": body.event_date,
            "start_time": body.start_time,
            "end_time": body.end_time,
            "location": body.location,
            "description": body.description,
            "status": "active",
        }))
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Delete an event together with its attendance records.
///
/// DELETE /api/v1/events/:id (admin only)
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteEventResponse>, ApiError> {
    let id = RecordId::parse(&id);
    let outcome = state
        .event_service()
        .delete_cascade(&id)
        .await
        .map_err(|e| match e {
            EventDeleteError::NotFound => ApiError::NotFound(format!("Event {} not found", id)),
            EventDeleteError::Store(store) => store.into(),
        })?;

    Ok(Json(DeleteEventResponse {
        deleted: true,
        attendance_deleted: outcome.attendance_deleted,
    }))
}
