//! User repository over a row store.

use std::sync::Arc;

use serde_json::Value;

use domain::models::{RecordId, User};

use crate::metrics::QueryTimer;
use crate::repositories::{decode_first, decode_row, decode_rows};
use crate::store::{filters, RowStore, StoreError};

/// Table holding portal accounts in both stores.
pub const USERS_TABLE: &str = "users";

/// Repository for user rows in one store instance.
///
/// The synchronizer holds two of these, one per store; nothing in here
/// knows which side it is on.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn RowStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Find a user by id, matching the id's exact encoding.
    pub async fn find_by_id(&self, id: &RecordId) -> Result<Option<User>, StoreError> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = self
            .store
            .select(
                USERS_TABLE,
                "*",
                &filters([("id", id.to_value())]),
                None,
                Some(1),
            )
            .await;
        timer.record();
        decode_first(result?)
    }

    /// Find a user by email address, the cross-store correlation key.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = self
            .store
            .select(
                USERS_TABLE,
                "*",
                &filters([("email", Value::from(email))]),
                None,
                Some(1),
            )
            .await;
        timer.record();
        decode_first(result?)
    }

    /// All users, in store order.
    pub async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let timer = QueryTimer::new("list_users");
        let result = self
            .store
            .select(USERS_TABLE, "*", &Default::default(), None, None)
            .await;
        timer.record();
        decode_rows(result?)
    }

    /// Insert a profile row and return it as stored.
    ///
    /// Takes the raw row rather than a `User` so callers control exactly
    /// which fields travel; replication to the secondary store must omit
    /// the primary id.
    pub async fn create(&self, row: Value) -> Result<User, StoreError> {
        let timer = QueryTimer::new("create_user");
        let result = self.store.insert(USERS_TABLE, row).await;
        timer.record();
        decode_row(result?)
    }

    /// Apply partial changes to the user with the given email.
    ///
    /// Returns how many rows were touched (0 when no such email exists).
    pub async fn update_by_email(&self, email: &str, changes: Value) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("update_user_by_email");
        let result = self
            .store
            .update(USERS_TABLE, changes, &filters([("email", Value::from(email))]))
            .await;
        timer.record();
        Ok(result?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{IdMode, MemoryStore};
    use serde_json::json;

    fn repo() -> UserRepository {
        UserRepository::new(Arc::new(MemoryStore::new(IdMode::Sequence)))
    }

    fn profile(email: &str) -> Value {
        json!({
            "email": email,
            "password_hash": "$argon2id$test",
            "first_name": "Ana",
            "last_name": "Cruz",
            "course": "BSIT",
            "year_level": 2,
            "section": "2B",
            "role": "student"
        })
    }

    #[tokio::test]
    async fn test_create_and_find_by_email() {
        let repo = repo();
        let created = repo.create(profile("ana@x.com")).await.unwrap();
        assert_eq!(created.id, RecordId::Numeric(1));

        let found = repo.find_by_email("ana@x.com").await.unwrap().unwrap();
        assert_eq!(found.email, "ana@x.com");
        assert_eq!(found.password_hash.as_deref(), Some("$argon2id$test"));

        assert!(repo.find_by_email("missing@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_matches_exact_encoding() {
        let repo = repo();
        let created = repo.create(profile("ana@x.com")).await.unwrap();

        assert!(repo.find_by_id(&created.id).await.unwrap().is_some());
        // The text rendering of a numeric id is a different id.
        assert!(repo
            .find_by_id(&RecordId::Text("1".to_string()))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_by_email() {
        let repo = repo();
        repo.create(profile("ana@x.com")).await.unwrap();

        let touched = repo
            .update_by_email("ana@x.com", json!({"section": "3C"}))
            .await
            .unwrap();
        assert_eq!(touched, 1);
        let user = repo.find_by_email("ana@x.com").await.unwrap().unwrap();
        assert_eq!(user.section.as_deref(), Some("3C"));

        let missed = repo
            .update_by_email("nobody@x.com", json!({"section": "3C"}))
            .await
            .unwrap();
        assert_eq!(missed, 0);
    }

    #[tokio::test]
    async fn test_list_all_preserves_store_order() {
        let repo = repo();
        repo.create(profile("a@x.com")).await.unwrap();
        repo.create(profile("b@x.com")).await.unwrap();
        let users = repo.list_all().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "a@x.com");
        assert_eq!(users[1].email, "b@x.com");
    }
}
