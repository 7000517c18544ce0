//! JWT session tokens for portal logins.
//!
//! The portal both issues and verifies its own tokens, so HS256 with a
//! shared secret is sufficient; there is no second service that would need
//! a public verification key.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Claims carried by a portal session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id in the primary store, as a string. Ids may be
    /// integer or UUID depending on when the account was created, so the
    /// claim is kept opaque.
    pub sub: String,
    /// User role (`student` or `admin`).
    pub role: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Unique token identifier.
    pub jti: String,
}

/// Default leeway in seconds for clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Signing configuration for session tokens.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Session token lifetime in seconds.
    pub token_expiry_secs: i64,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("token_expiry_secs", &self.token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a config from a shared secret with the default leeway.
    pub fn new(secret: &str, token_expiry_secs: i64) -> Self {
        Self::with_leeway(secret, token_expiry_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a config from a shared secret with an explicit leeway.
    pub fn with_leeway(secret: &str, token_expiry_secs: i64, leeway_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_secs,
            leeway_secs,
        }
    }

    /// Issues a session token for the given user id and role.
    pub fn issue_token(&self, user_id: &str, role: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: (now + Duration::seconds(self.token_expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates a session token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-not-for-production", 3600)
    }

    #[test]
    fn test_issue_and_validate() {
        let config = test_config();
        let token = config.issue_token("42", "student").unwrap();
        let claims = config.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, "student");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_uuid_subject_survives() {
        let config = test_config();
        let token = config
            .issue_token("5f4c9a52-9e6f-4c7a-9a1e-2e3de3a0c001", "admin")
            .unwrap();
        let claims = config.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "5f4c9a52-9e6f-4c7a-9a1e-2e3de3a0c001");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_jti_is_unique_per_token() {
        let config = test_config();
        let a = config.validate_token(&config.issue_token("1", "student").unwrap());
        let b = config.validate_token(&config.issue_token("1", "student").unwrap());
        assert_ne!(a.unwrap().jti, b.unwrap().jti);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = test_config().issue_token("42", "student").unwrap();
        let other = JwtConfig::new("a-different-secret", 3600);
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Zero leeway and a negative expiry produce an already-expired token.
        let config = JwtConfig::with_leeway("test-secret-not-for-production", -60, 0);
        let token = config.issue_token("42", "student").unwrap();
        assert!(matches!(
            config.validate_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            test_config().validate_token("not.a.jwt"),
            Err(JwtError::InvalidToken(_))
        ));
    }
}
