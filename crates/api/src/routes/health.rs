//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use persistence::store::Filters;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub stores: StoresHealth,
}

/// Connectivity of the two row stores.
#[derive(Debug, Serialize)]
pub struct StoresHealth {
    pub primary: StoreHealth,
    pub secondary: StoreHealth,
}

#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub connected: bool,
    pub latency_ms: u64,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

async fn probe(store: &dyn persistence::store::RowStore) -> StoreHealth {
    let start = std::time::Instant::now();
    let connected = store
        .select("users", "id", &Filters::new(), None, Some(1))
        .await
        .is_ok();
    StoreHealth {
        connected,
        latency_ms: start.elapsed().as_millis() as u64,
    }
}

/// Full health check endpoint.
///
/// GET /api/health
///
/// Reports degraded (but still 200) when only the secondary store is
/// down, since the portal keeps working without its mirror.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let primary = probe(state.primary.as_ref()).await;
    let secondary = probe(state.secondary.as_ref()).await;

    let (code, status) = match (primary.connected, secondary.connected) {
        (true, true) => (StatusCode::OK, "healthy"),
        (true, false) => (StatusCode::OK, "degraded"),
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            stores: StoresHealth { primary, secondary },
        }),
    )
}

/// Readiness probe: the portal is ready when the primary store answers.
///
/// GET /api/health/ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    let primary = probe(state.primary.as_ref()).await;
    if primary.connected {
        (
            StatusCode::OK,
            Json(StatusResponse {
                status: "ready".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusResponse {
                status: "not ready".to_string(),
            }),
        )
    }
}

/// Liveness probe.
///
/// GET /api/health/live
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}
