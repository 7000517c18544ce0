//! User account domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::id::RecordId;

/// A portal account as stored in either row store.
///
/// The primary and secondary stores generate ids independently, so the same
/// person can have a numeric id in one store and a UUID in the other.
/// `email` is the only correlation key that holds across stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    #[serde(skip_serializing)] // Never serialize password hash to API responses
    #[serde(default)]
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub year_level: Option<i64>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Full display name used in report rows.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Portal role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: RecordId::Numeric(1),
            email: "jose.rizal@example.edu".to_string(),
            password_hash: Some("$argon2id$test".to_string()),
            first_name: "Jose".to_string(),
            last_name: "Rizal".to_string(),
            course: Some("BSIT".to_string()),
            year_level: Some(3),
            section: Some("3A".to_string()),
            role: UserRole::Student,
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("STUDENT").unwrap(), UserRole::Student);
        assert!(UserRole::from_str("teacher").is_err());
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_deserialize_legacy_row_without_role() {
        // Rows that predate the role column default to student.
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 9,
            "email": "old@example.edu",
            "first_name": "Old",
            "last_name": "Row"
        }))
        .unwrap();
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(user.id, RecordId::Numeric(9));
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample_user().full_name(), "Jose Rizal");
    }
}
