//! In-memory implementation of the row-store contract.
//!
//! Backs the test suites so they run without either database. Id generation
//! is configurable because the two production stores differ: the primary
//! still hands out integer sequence ids while the secondary generates
//! UUIDs. Tables can be poisoned to simulate a store outage.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{Filters, RowStore, StoreError};

/// How the store assigns ids to inserted rows that carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMode {
    /// Integer sequence starting at 1 (primary-store style).
    Sequence,
    /// Random UUID text ids (secondary-store style).
    UuidV4,
}

/// An in-process row store.
pub struct MemoryStore {
    id_mode: IdMode,
    next_id: AtomicI64,
    tables: RwLock<HashMap<String, Vec<Value>>>,
    poisoned: RwLock<HashSet<String>>,
}

impl MemoryStore {
    pub fn new(id_mode: IdMode) -> Self {
        Self {
            id_mode,
            next_id: AtomicI64::new(1),
            tables: RwLock::new(HashMap::new()),
            poisoned: RwLock::new(HashSet::new()),
        }
    }

    /// Makes every subsequent operation on `table` fail with
    /// [`StoreError::Unavailable`]. Used by tests to simulate an outage.
    pub async fn poison(&self, table: &str) {
        self.poisoned.write().await.insert(table.to_string());
    }

    /// Clears a previous [`poison`](Self::poison) call.
    pub async fn heal(&self, table: &str) {
        self.poisoned.write().await.remove(table);
    }

    /// Number of rows currently in a table.
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    async fn check_poisoned(&self, table: &str) -> Result<(), StoreError> {
        if self.poisoned.read().await.contains(table) {
            return Err(StoreError::Unavailable(format!(
                "connection to table '{}' refused",
                table
            )));
        }
        Ok(())
    }

    fn assign_generated_fields(&self, row: &mut Map<String, Value>) {
        let missing_id = !row.contains_key("id") || row.get("id") == Some(&Value::Null);
        if missing_id {
            let id = match self.id_mode {
                IdMode::Sequence => Value::from(self.next_id.fetch_add(1, Ordering::SeqCst)),
                IdMode::UuidV4 => Value::from(Uuid::new_v4().to_string()),
            };
            row.insert("id".to_string(), id);
        }
        if !row.contains_key("created_at") {
            row.insert("created_at".to_string(), Value::from(Utc::now().to_rfc3339()));
        }
    }
}

fn matches(row: &Value, filters: &Filters) -> bool {
    filters.iter().all(|(field, expected)| {
        row.get(field).unwrap_or(&Value::Null) == expected
    })
}

/// Compares two JSON values for ordering purposes: numbers numerically,
/// everything else by string form.
fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        _ => value_to_string(a).cmp(&value_to_string(b)),
    }
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select(
        &self,
        table: &str,
        _columns: &str,
        filters: &Filters,
        order: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError> {
        self.check_poisoned(table).await?;

        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order {
            let (column, descending) = match order.rsplit_once('.') {
                Some((column, "desc")) => (column, true),
                Some((column, "asc")) => (column, false),
                _ => (order, false),
            };
            rows.sort_by(|a, b| {
                let ordering = compare_values(
                    a.get(column).unwrap_or(&Value::Null),
                    b.get(column).unwrap_or(&Value::Null),
                );
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        self.check_poisoned(table).await?;

        let mut object = match row {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::Decode(format!(
                    "insert expects a JSON object, got {}",
                    other
                )))
            }
        };
        self.assign_generated_fields(&mut object);

        let stored = Value::Object(object);
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        changes: Value,
        filters: &Filters,
    ) -> Result<Vec<Value>, StoreError> {
        self.check_poisoned(table).await?;

        let changes = match changes {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::Decode(format!(
                    "update expects a JSON object, got {}",
                    other
                )))
            }
        };

        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut() {
                if matches(row, filters) {
                    if let Value::Object(existing) = row {
                        for (field, value) in &changes {
                            existing.insert(field.clone(), value.clone());
                        }
                    }
                    updated.push(row.clone());
                }
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &Filters) -> Result<u64, StoreError> {
        self.check_poisoned(table).await?;

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !matches(row, filters));
        Ok((before - rows.len()) as u64)
    }
}
