//! Login against the primary store.

use thiserror::Error;
use tracing::info;

use domain::models::User;
use persistence::repositories::UserRepository;
use persistence::store::StoreError;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{verify_password, PasswordError};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password. Which one is wrong is never disclosed.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Login failed: {0}")]
    Store(#[from] StoreError),
    #[error("Login failed: {0}")]
    Password(#[from] PasswordError),
    #[error("Login failed: {0}")]
    Token(#[from] JwtError),
}

/// A successful login: the session token plus the authenticated profile.
#[derive(Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Authentication service. Logins always hit the primary store; the
/// secondary replica is for reporting, not for auth.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(users: UserRepository, jwt: JwtConfig) -> Self {
        Self { users, jwt }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        // Accounts replicated before the password column existed have no
        // hash; they cannot log in until an admin resets them.
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .jwt
            .issue_token(&user.id.to_string(), user.role.as_str())?;
        info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome { token, user })
    }
}
