//! Event repository over a row store.

use std::sync::Arc;

use serde_json::Value;

use domain::models::{Event, RecordId};

use crate::metrics::QueryTimer;
use crate::repositories::{decode_first, decode_row, decode_rows};
use crate::store::{filters, RowStore, StoreError};

/// Table holding events in the primary store.
pub const EVENTS_TABLE: &str = "events";

#[derive(Clone)]
pub struct EventRepository {
    store: Arc<dyn RowStore>,
}

impl EventRepository {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Find an event by id, matching the id's exact encoding.
    pub async fn find_by_id(&self, id: &RecordId) -> Result<Option<Event>, StoreError> {
        let timer = QueryTimer::new("find_event_by_id");
        let result = self
            .store
            .select(
                EVENTS_TABLE,
                "*",
                &filters([("id", id.to_value())]),
                None,
                Some(1),
            )
            .await;
        timer.record();
        decode_first(result?)
    }

    /// All events, in store order.
    pub async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        let timer = QueryTimer::new("list_events");
        let result = self
            .store
            .select(EVENTS_TABLE, "*", &Default::default(), None, None)
            .await;
        timer.record();
        decode_rows(result?)
    }

    /// Insert an event row and return it as stored.
    pub async fn create(&self, row: Value) -> Result<Event, StoreError> {
        let timer = QueryTimer::new("create_event");
        let result = self.store.insert(EVENTS_TABLE, row).await;
        timer.record();
        decode_row(result?)
    }

    /// Delete the event row itself. Attendance rows referencing it are the
    /// caller's responsibility (see the deletion cascade in the API layer).
    pub async fn delete_by_id(&self, id: &RecordId) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("delete_event");
        let result = self
            .store
            .delete(EVENTS_TABLE, &filters([("id", id.to_value())]))
            .await;
        timer.record();
        result
    }
}
