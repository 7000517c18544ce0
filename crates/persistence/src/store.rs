//! The generic row-store contract both backend databases implement.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Equality filters on row fields, e.g. `{"email": "a@x.com"}`.
///
/// The stores only ever need equality matching; richer predicates are not
/// part of the contract.
pub type Filters = BTreeMap<String, Value>;

/// Builds a filter map from field/value pairs.
pub fn filters<const N: usize>(pairs: [(&str, Value); N]) -> Filters {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Errors surfaced by a row store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (connection refused, timeout).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a non-success status.
    #[error("Store request failed with status {status}: {message}")]
    Backend { status: u16, message: String },

    /// The store answered with a body that did not decode.
    #[error("Failed to decode store response: {0}")]
    Decode(String),
}

/// A REST-backed row database.
///
/// Rows travel as JSON objects; callers decode them into domain models.
/// The portal talks to two independently configured instances of this
/// trait (primary and secondary), whose generated ids are not comparable.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Selects rows matching the filters, optionally ordered
    /// (`"column.asc"` / `"column.desc"`) and limited.
    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &Filters,
        order: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Inserts one row and returns it as stored (with generated fields).
    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError>;

    /// Applies partial changes to all rows matching the filters and
    /// returns the updated rows.
    async fn update(
        &self,
        table: &str,
        changes: Value,
        filters: &Filters,
    ) -> Result<Vec<Value>, StoreError>;

    /// Deletes all rows matching the filters and returns how many went.
    async fn delete(&self, table: &str, filters: &Filters) -> Result<u64, StoreError>;
}
