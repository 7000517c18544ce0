use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use persistence::repositories::{AttendanceRepository, EventRepository, UserRepository};
use persistence::store::RowStore;
use shared::jwt::JwtConfig;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_admin, require_auth};
use crate::routes::{admin, auth, events, health, reports, users};
use crate::services::auth::AuthService;
use crate::services::events::EventService;
use crate::services::report::ReportBuilder;
use crate::services::sync::DualWriteSync;

/// Shared application state: config, token signing and the two stores.
///
/// Repositories and services are cheap wrappers over the store handles, so
/// they are constructed per request instead of being stored here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub primary: Arc<dyn RowStore>,
    pub secondary: Arc<dyn RowStore>,
}

impl AppState {
    pub fn primary_users(&self) -> UserRepository {
        UserRepository::new(self.primary.clone())
    }

    pub fn secondary_users(&self) -> UserRepository {
        UserRepository::new(self.secondary.clone())
    }

    pub fn sync(&self) -> DualWriteSync {
        DualWriteSync::new(
            self.config.stores.dual_sync,
            self.primary_users(),
            self.secondary_users(),
        )
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.primary_users(), (*self.jwt).clone())
    }

    pub fn event_service(&self) -> EventService {
        EventService::new(
            EventRepository::new(self.primary.clone()),
            AttendanceRepository::new(self.primary.clone()),
        )
    }

    pub fn report_builder(&self) -> ReportBuilder {
        ReportBuilder::new(
            self.primary_users(),
            EventRepository::new(self.primary.clone()),
            AttendanceRepository::new(self.primary.clone()),
        )
    }
}

pub fn create_app(
    config: Config,
    primary: Arc<dyn RowStore>,
    secondary: Arc<dyn RowStore>,
) -> Router {
    let config = Arc::new(config);
    let jwt = Arc::new(JwtConfig::with_leeway(
        &config.auth.token_secret,
        config.auth.token_expiry_secs,
        config.auth.leeway_secs,
    ));

    let state = AppState {
        config: config.clone(),
        jwt,
        primary,
        secondary,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Routes requiring a valid session token
    let authed_routes = Router::new()
        .route("/api/v1/users/me", get(users::get_me))
        .route("/api/v1/users/me", put(users::update_me))
        .route("/api/v1/events", get(events::list_events))
        .route("/api/v1/events/:id", get(events::get_event))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Routes requiring the admin role
    let admin_routes = Router::new()
        .route("/api/v1/events", post(events::create_event))
        .route("/api/v1/events/:id", delete(events::delete_event))
        .route("/api/v1/reports/:kind", get(reports::generate_report))
        .route("/api/v1/admin/users", get(admin::list_users))
        .route("/api/v1/admin/users/:id/resync", post(admin::resync_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
