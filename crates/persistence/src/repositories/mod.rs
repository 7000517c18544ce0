//! Typed repositories over the row-store contract.

mod attendance;
mod event;
mod user;

pub use attendance::AttendanceRepository;
pub use event::EventRepository;
pub use user::UserRepository;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::store::StoreError;

/// Decodes a stored row into a domain model.
pub(crate) fn decode_row<T: DeserializeOwned>(row: Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Decodes a batch of stored rows into domain models.
pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter().map(decode_row).collect()
}

/// Decodes the first row of a result set, if any.
pub(crate) fn decode_first<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Option<T>, StoreError> {
    rows.into_iter().next().map(decode_row).transpose()
}
