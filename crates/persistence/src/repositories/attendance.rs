//! Attendance record repository over a row store.

use std::sync::Arc;

use serde_json::Value;

use domain::models::{AttendanceRecord, RecordId};

use crate::metrics::QueryTimer;
use crate::repositories::{decode_row, decode_rows};
use crate::store::{filters, RowStore, StoreError};

/// Table holding check-in/check-out rows in the primary store.
pub const ATTENDANCE_TABLE: &str = "attendance_records";

#[derive(Clone)]
pub struct AttendanceRepository {
    store: Arc<dyn RowStore>,
}

impl AttendanceRepository {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// All attendance rows, in store order. Report output preserves this
    /// order, so no sort is applied here.
    pub async fn list_all(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        let timer = QueryTimer::new("list_attendance");
        let result = self
            .store
            .select(ATTENDANCE_TABLE, "*", &Default::default(), None, None)
            .await;
        timer.record();
        decode_rows(result?)
    }

    /// Insert a scan row and return it as stored.
    pub async fn create(&self, row: Value) -> Result<AttendanceRecord, StoreError> {
        let timer = QueryTimer::new("create_attendance");
        let result = self.store.insert(ATTENDANCE_TABLE, row).await;
        timer.record();
        decode_row(result?)
    }

    /// Delete every attendance row referencing an event.
    pub async fn delete_by_event(&self, event_id: &RecordId) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("delete_attendance_by_event");
        let result = self
            .store
            .delete(
                ATTENDANCE_TABLE,
                &filters([("event_id", event_id.to_value())]),
            )
            .await;
        timer.record();
        result
    }
}
