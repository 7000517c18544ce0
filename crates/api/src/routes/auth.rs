//! Registration and login routes.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain::models::User;
use shared::validation::{validate_password, validate_section};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::auth::AuthError;
use crate::services::sync::{RegistrationError, RegistrationInput};

/// Request body for account registration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = validate_password))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(length(max = 100, message = "Course must be at most 100 characters"))]
    pub course: Option<String>,

    #[validate(range(min = 1, max = 6, message = "Year level must be between 1 and 6"))]
    pub year_level: Option<i64>,

    #[validate(custom(function = validate_section))]
    pub section: Option<String>,
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Register a new student account.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    body.validate()?;

    let user = state
        .sync()
        .register_user(RegistrationInput {
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
            course: body.course,
            year_level: body.year_level,
            section: body.section,
        })
        .await
        .map_err(|e| match e {
            RegistrationError::EmailTaken => {
                ApiError::Conflict("Email is already registered".into())
            }
            RegistrationError::PrimaryWrite(store) => store.into(),
            RegistrationError::Password(p) => ApiError::Internal(p.to_string()),
        })?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticate and obtain a session token.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    body.validate()?;

    let outcome = state
        .auth_service()
        .login(&body.email, &body.password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".into())
            }
            AuthError::Store(store) => store.into(),
            other => ApiError::Internal(other.to_string()),
        })?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        user: outcome.user,
    }))
}
