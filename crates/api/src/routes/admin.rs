//! Admin routes: store maintenance operations.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use domain::models::{RecordId, User};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::sync::SyncOutcome;

/// Response for a manual resync request.
#[derive(Debug, Serialize)]
pub struct ResyncResponse {
    pub user_id: String,
    pub sync: SyncOutcome,
}

/// List all portal accounts in the primary store.
///
/// GET /api/v1/admin/users (admin only)
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.primary_users().list_all().await?;
    Ok(Json(users))
}

/// Push one user's primary-store profile to the secondary store.
///
/// POST /api/v1/admin/users/:id/resync (admin only)
///
/// Safe to repeat: an existing secondary row is overwritten, a missing
/// one created. The outcome says what happened; the request itself only
/// fails for transport-level reasons.
pub async fn resync_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResyncResponse>, ApiError> {
    let id = RecordId::parse(&id);
    let sync = state.sync().sync_user_to_secondary(&id).await;
    Ok(Json(ResyncResponse {
        user_id: id.to_string(),
        sync,
    }))
}
