//! Session-token authentication middleware.
//!
//! Validates the Bearer token in the Authorization header and stores the
//! authenticated identity in request extensions for downstream handlers.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use domain::models::{RecordId, UserRole};
use shared::jwt::JwtConfig;

use crate::app::AppState;

/// Authenticated identity extracted from a session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User id in the primary store; numeric or text depending on when the
    /// account was created.
    pub user_id: RecordId,
    pub role: UserRole,
    pub jti: String,
}

impl AuthUser {
    /// Validates a session token and returns the authenticated identity.
    pub fn validate(jwt: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt
            .validate_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|_| "Invalid role in token".to_string())?;

        Ok(AuthUser {
            user_id: RecordId::parse(&claims.sub),
            role,
            jti: claims.jti,
        })
    }
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Middleware that requires a valid session token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&req) else {
        return unauthorized_response("Missing or invalid Authorization header");
    };

    match AuthUser::validate(&state.jwt, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("Session token validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

/// Middleware that requires a valid session token with the admin role.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&req) else {
        return unauthorized_response("Missing or invalid Authorization header");
    };

    match AuthUser::validate(&state.jwt, token) {
        Ok(auth) if auth.role == UserRole::Admin => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Ok(_) => forbidden_response("Admin role required"),
        Err(e) => {
            tracing::debug!("Session token validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized", "message": message })),
    )
        .into_response()
}

fn forbidden_response(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden", "message": message })),
    )
        .into_response()
}
