//! Event lifecycle operations, most notably the deletion cascade.

use thiserror::Error;
use tracing::{info, warn};

use domain::models::{Event, RecordId};
use persistence::repositories::{AttendanceRepository, EventRepository};
use persistence::store::StoreError;

#[derive(Debug, Error)]
pub enum EventDeleteError {
    #[error("Event not found")]
    NotFound,
    #[error("Event deletion failed: {0}")]
    Store(#[from] StoreError),
}

/// What a completed cascade actually removed.
#[derive(Debug, Clone, Copy)]
pub struct CascadeOutcome {
    pub attendance_deleted: u64,
}

/// Event service over the primary store.
#[derive(Clone)]
pub struct EventService {
    events: EventRepository,
    attendance: AttendanceRepository,
}

impl EventService {
    pub fn new(events: EventRepository, attendance: AttendanceRepository) -> Self {
        Self { events, attendance }
    }

    pub async fn find(&self, id: &RecordId) -> Result<Option<Event>, StoreError> {
        self.events.find_by_id(id).await
    }

    pub async fn list(&self) -> Result<Vec<Event>, StoreError> {
        self.events.list_all().await
    }

    pub async fn create(&self, row: serde_json::Value) -> Result<Event, StoreError> {
        self.events.create(row).await
    }

    /// Deletes an event and every attendance row referencing it.
    ///
    /// The existence check runs before anything is deleted, so an unknown
    /// id leaves both tables untouched. Child rows go first; if their
    /// delete fails the cascade still removes the event itself, since an
    /// admin retrying a half-deleted event would otherwise be stuck on
    /// the not-found error.
    pub async fn delete_cascade(
        &self,
        event_id: &RecordId,
    ) -> Result<CascadeOutcome, EventDeleteError> {
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(EventDeleteError::NotFound);
        }

        let attendance_deleted = match self.attendance.delete_by_event(event_id).await {
            Ok(count) => count,
            Err(error) => {
                warn!(event_id = %event_id, %error, "Attendance cleanup failed, deleting event anyway");
                0
            }
        };

        self.events.delete_by_id(event_id).await?;
        info!(event_id = %event_id, attendance_deleted, "Event deleted");
        Ok(CascadeOutcome { attendance_deleted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::memory::{IdMode, MemoryStore};
    use persistence::store::RowStore;
    use serde_json::json;
    use std::sync::Arc;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: EventService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new(IdMode::Sequence));
        let service = EventService::new(
            EventRepository::new(store.clone()),
            AttendanceRepository::new(store.clone()),
        );
        Fixture { store, service }
    }

    async fn seed_event(f: &Fixture, id: i64) {
        f.store
            .insert(
                "events",
                json!({"id": id, "title": "Orientation", "event_date": "2024-01-15", "status": "active"}),
            )
            .await
            .unwrap();
    }

    async fn seed_scan(f: &Fixture, event_id: i64) {
        f.store
            .insert(
                "attendance_records",
                json!({"user_id": 5, "event_id": event_id, "attendance_type": "check_in"}),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cascade_deletes_children_then_event() {
        let f = fixture();
        seed_event(&f, 9).await;
        for _ in 0..4 {
            seed_scan(&f, 9).await;
        }
        seed_scan(&f, 10).await;

        let outcome = f
            .service
            .delete_cascade(&RecordId::Numeric(9))
            .await
            .unwrap();
        assert_eq!(outcome.attendance_deleted, 4);
        assert_eq!(f.store.row_count("events").await, 0);
        // The other event's scans are untouched.
        assert_eq!(f.store.row_count("attendance_records").await, 1);
    }

    #[tokio::test]
    async fn test_unknown_event_has_no_side_effects() {
        let f = fixture();
        seed_event(&f, 9).await;
        seed_scan(&f, 9).await;

        let err = f
            .service
            .delete_cascade(&RecordId::Numeric(404))
            .await
            .unwrap_err();
        assert!(matches!(err, EventDeleteError::NotFound));
        assert_eq!(f.store.row_count("events").await, 1);
        assert_eq!(f.store.row_count("attendance_records").await, 1);
    }

    #[tokio::test]
    async fn test_event_still_deleted_when_attendance_cleanup_fails() {
        let f = fixture();
        seed_event(&f, 9).await;
        f.store.poison("attendance_records").await;

        let outcome = f
            .service
            .delete_cascade(&RecordId::Numeric(9))
            .await
            .unwrap();
        assert_eq!(outcome.attendance_deleted, 0);
        assert_eq!(f.store.row_count("events").await, 0);
    }

    #[tokio::test]
    async fn test_id_encoding_is_exact() {
        // A text "9" does not match the numerically-typed event row.
        let f = fixture();
        seed_event(&f, 9).await;

        let err = f
            .service
            .delete_cascade(&RecordId::Text("9".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, EventDeleteError::NotFound));
        assert_eq!(f.store.row_count("events").await, 1);
    }
}
