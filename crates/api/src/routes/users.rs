//! User profile routes for viewing and updating the logged-in account.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;
use validator::Validate;

use domain::models::User;
use shared::validation::{validate_section, validate_year_level};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::sync::SyncOutcome;

/// Request body for updating the current profile. Every field is optional;
/// only the fields present in the request are written.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(length(max = 100, message = "Course must be at most 100 characters"))]
    pub course: Option<String>,

    pub year_level: Option<i64>,

    pub section: Option<String>,
}

impl UpdateProfileRequest {
    /// The partial change set, containing only the submitted fields.
    fn changes(&self) -> Value {
        let mut map = Map::new();
        if let Some(v) = &self.first_name {
            map.insert("first_name".into(), json!(v));
        }
        if let Some(v) = &self.last_name {
            map.insert("last_name".into(), json!(v));
        }
        if let Some(v) = &self.course {
            map.insert("course".into(), json!(v));
        }
        if let Some(v) = self.year_level {
            map.insert("year_level".into(), json!(v));
        }
        if let Some(v) = &self.section {
            map.insert("section".into(), json!(v));
        }
        Value::Object(map)
    }
}

/// Response for a profile update: the updated profile plus the mirror
/// outcome, so the caller can see replication lag without a second call.
#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub user: User,
    pub sync: SyncOutcome,
}

/// Get the current user's profile from the primary store.
///
/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .primary_users()
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// Update the current user's profile.
///
/// PUT /api/v1/users/me
///
/// Writes the primary store, then propagates the same changes to the
/// secondary store. Replication problems never fail the request; they are
/// reported in the `sync` field of the response.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    body.validate()?;
    if let Some(year) = body.year_level {
        validate_year_level(year).map_err(|e| ApiError::Validation(error_message(e)))?;
    }
    if let Some(section) = &body.section {
        validate_section(section).map_err(|e| ApiError::Validation(error_message(e)))?;
    }

    let users = state.primary_users();
    let current = users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let changes = body.changes();
    users.update_by_email(&current.email, changes.clone()).await?;
    info!(user_id = %auth.user_id, "Profile updated in primary store");

    let sync = state
        .sync()
        .sync_user_update_to_secondary(&auth.user_id, changes)
        .await;

    let user = users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UpdateProfileResponse { user, sync }))
}

fn error_message(e: validator::ValidationError) -> String {
    e.message
        .map(|m| m.to_string())
        .unwrap_or_else(|| "invalid value".to_string())
}
