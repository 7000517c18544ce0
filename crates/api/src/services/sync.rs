//! Dual-write user synchronization between the primary and secondary store.
//!
//! The primary store is authoritative: a registration that cannot write to
//! it fails outright. The secondary store is a best-effort mirror; every
//! write to it is allowed to fail without affecting the caller, and a
//! missed write is recovered later through the manual resync operation.
//! Rows are correlated by `email`; the stores generate ids independently
//! (integer sequences on one side, UUIDs on the other), so ids are never
//! assumed portable between them.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use domain::models::{RecordId, User};
use persistence::repositories::UserRepository;
use persistence::store::StoreError;
use shared::password::{hash_password, PasswordError};

/// Errors from the registration path. Only primary-store problems ever
/// reach the caller; secondary replication failures are logged and
/// swallowed by design.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Primary store write failed: {0}")]
    PrimaryWrite(#[source] StoreError),

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Failed to hash password: {0}")]
    Password(#[from] PasswordError),
}

/// A new account as submitted by the registration form.
#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub course: Option<String>,
    pub year_level: Option<i64>,
    pub section: Option<String>,
}

/// The result of a sync operation. Syncs never fail the caller; the
/// outcome says whether the mirror was written and why not if it wasn't.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub synced: bool,
    pub message: String,
}

impl SyncOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            synced: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            synced: false,
            message: message.into(),
        }
    }

    fn disabled() -> Self {
        Self::failed("dual-sync is disabled")
    }
}

/// Keeps the secondary user store eventually consistent with the primary.
#[derive(Clone)]
pub struct DualWriteSync {
    enabled: bool,
    primary: UserRepository,
    secondary: UserRepository,
}

impl DualWriteSync {
    pub fn new(enabled: bool, primary: UserRepository, secondary: UserRepository) -> Self {
        Self {
            enabled,
            primary,
            secondary,
        }
    }

    /// Registers a new account: hash the password, write the profile to
    /// the primary store, then mirror it to the secondary store.
    ///
    /// The primary write is the registration; if it fails the whole call
    /// fails. The secondary write is replication; if it fails the account
    /// still exists and the call still succeeds, leaving a log entry for
    /// the admin resync path to pick up.
    pub async fn register_user(&self, input: RegistrationInput) -> Result<User, RegistrationError> {
        let existing = self
            .primary
            .find_by_email(&input.email)
            .await
            .map_err(RegistrationError::PrimaryWrite)?;
        if existing.is_some() {
            return Err(RegistrationError::EmailTaken);
        }

        let password_hash = hash_password(&input.password)?;
        let row = json!({
            "email": input.email,
            "password_hash": password_hash,
            "first_name": input.first_name,
            "last_name": input.last_name,
            "course": input.course,
            "year_level": input.year_level,
            "section": input.section,
            "role": "student",
        });

        let user = self
            .primary
            .create(row)
            .await
            .map_err(RegistrationError::PrimaryWrite)?;

        info!(email = %user.email, user_id = %user.id, "Registered user in primary store");

        if self.enabled {
            self.replicate_new_profile(&user.email).await;
        }

        Ok(user)
    }

    /// Best-effort replication of a freshly registered profile. Re-reads
    /// the row from the primary store by email so the replica carries the
    /// canonical field values, then inserts it into the secondary store.
    /// Never propagates errors.
    async fn replicate_new_profile(&self, email: &str) {
        let result = async {
            let user = self
                .primary
                .find_by_email(email)
                .await?
                .ok_or_else(|| StoreError::Decode("registered row vanished from primary".into()))?;
            self.secondary.create(profile_fields(&user)).await
        }
        .await;

        match result {
            Ok(replica) => {
                info!(email = %email, secondary_id = %replica.id, "Replicated new user to secondary store");
            }
            Err(e) => {
                // Deliberately swallowed: the primary write already
                // succeeded and the registration must not fail here.
                warn!(email = %email, error = %e, "secondary_sync_failed: could not replicate new user");
            }
        }
    }

    /// Manually (re)syncs one user from the primary store to the
    /// secondary. Overwrites an existing secondary row (matched by email)
    /// with the primary's current values, or inserts a fresh row without
    /// the primary id so the secondary generates its own.
    pub async fn sync_user_to_secondary(&self, user_id: &RecordId) -> SyncOutcome {
        if !self.enabled {
            return SyncOutcome::disabled();
        }

        match self.try_full_sync(user_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "secondary_sync_failed: full sync errored");
                SyncOutcome::failed(format!("sync failed: {}", e))
            }
        }
    }

    async fn try_full_sync(&self, user_id: &RecordId) -> Result<SyncOutcome, StoreError> {
        let Some(user) = self.primary.find_by_id(user_id).await? else {
            return Ok(SyncOutcome::failed(format!(
                "user {} not found in primary store",
                user_id
            )));
        };

        let fields = profile_fields(&user);
        if self.secondary.find_by_email(&user.email).await?.is_some() {
            self.secondary.update_by_email(&user.email, fields).await?;
            info!(email = %user.email, "Overwrote existing secondary profile");
            Ok(SyncOutcome::ok("updated existing profile in secondary store"))
        } else {
            let replica = self.secondary.create(fields).await?;
            info!(email = %user.email, secondary_id = %replica.id, "Replicated profile to secondary store");
            Ok(SyncOutcome::ok("replicated profile to secondary store"))
        }
    }

    /// Propagates a partial profile update to the secondary store. If the
    /// user never replicated (no secondary row for that email), falls back
    /// to a full sync so the mirror self-heals instead of receiving a
    /// partial row.
    pub async fn sync_user_update_to_secondary(
        &self,
        user_id: &RecordId,
        changes: Value,
    ) -> SyncOutcome {
        if !self.enabled {
            return SyncOutcome::disabled();
        }

        let user = match self.primary.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return SyncOutcome::failed(format!("user {} not found in primary store", user_id))
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "secondary_sync_failed: primary read errored");
                return SyncOutcome::failed(format!("sync failed: {}", e));
            }
        };

        match self.secondary.find_by_email(&user.email).await {
            Ok(Some(_)) => match self.secondary.update_by_email(&user.email, changes).await {
                Ok(_) => {
                    info!(email = %user.email, "Propagated profile update to secondary store");
                    SyncOutcome::ok("updated profile in secondary store")
                }
                Err(e) => {
                    warn!(email = %user.email, error = %e, "secondary_sync_failed: update errored");
                    SyncOutcome::failed(format!("sync failed: {}", e))
                }
            },
            Ok(None) => self.sync_user_to_secondary(user_id).await,
            Err(e) => {
                warn!(email = %user.email, error = %e, "secondary_sync_failed: secondary read errored");
                SyncOutcome::failed(format!("sync failed: {}", e))
            }
        }
    }
}

/// The replicable profile: every primary field except the id, which the
/// secondary store generates for itself.
fn profile_fields(user: &User) -> Value {
    json!({
        "email": user.email,
        "password_hash": user.password_hash,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "course": user.course,
        "year_level": user.year_level,
        "section": user.section,
        "role": user.role,
        "created_at": user.created_at,
    })
}
