//! PostgREST-style HTTP implementation of the row-store contract.
//!
//! Both backend databases expose the same REST dialect: equality filters as
//! `?column=eq.value`, projections via `select=`, and representation
//! echoes on writes via the `Prefer` header. Authentication is the service
//! api key, sent both as `apikey` and as a bearer token.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::store::{Filters, RowStore, StoreError};

/// Connection settings for one store instance.
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// REST root of the store, e.g. `https://xyz.example.co/rest/v1`.
    pub url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// A REST row store client.
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(config: &RestStoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// Renders one equality filter in PostgREST operator syntax.
fn filter_expr(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{}", s),
        other => format!("eq.{}", other),
    }
}

fn filter_pairs(filters: &Filters) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|(field, value)| (field.clone(), filter_expr(value)))
        .collect()
}

fn map_transport(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Unavailable(format!("request timed out: {}", err))
    } else {
        StoreError::Unavailable(err.to_string())
    }
}

async fn parse_rows(response: reqwest::Response) -> Result<Vec<Value>, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(StoreError::Backend {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<Vec<Value>>()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl RowStore for RestStore {
    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &Filters,
        order: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut query = vec![("select".to_string(), columns.to_string())];
        query.extend(filter_pairs(filters));
        if let Some(order) = order {
            query.push(("order".to_string(), order.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit".to_string(), limit.to_string()));
        }

        let response = self
            .request(self.client.get(self.table_url(table)))
            .query(&query)
            .send()
            .await
            .map_err(map_transport)?;

        parse_rows(response).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        let response = self
            .request(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(map_transport)?;

        let mut rows = parse_rows(response).await?;
        if rows.is_empty() {
            return Err(StoreError::Decode(
                "insert returned no representation".to_string(),
            ));
        }
        Ok(rows.remove(0))
    }

    async fn update(
        &self,
        table: &str,
        changes: Value,
        filters: &Filters,
    ) -> Result<Vec<Value>, StoreError> {
        let response = self
            .request(self.client.patch(self.table_url(table)))
            .header("Prefer", "return=representation")
            .query(&filter_pairs(filters))
            .json(&changes)
            .send()
            .await
            .map_err(map_transport)?;

        parse_rows(response).await
    }

    async fn delete(&self, table: &str, filters: &Filters) -> Result<u64, StoreError> {
        let response = self
            .request(self.client.delete(self.table_url(table)))
            .header("Prefer", "return=representation")
            .query(&filter_pairs(filters))
            .send()
            .await
            .map_err(map_transport)?;

        let rows = parse_rows(response).await?;
        Ok(rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::filters;
    use serde_json::json;

    #[test]
    fn test_filter_expr_by_value_type() {
        assert_eq!(filter_expr(&json!("a@x.com")), "eq.a@x.com");
        assert_eq!(filter_expr(&json!(42)), "eq.42");
        assert_eq!(filter_expr(&json!(true)), "eq.true");
        assert_eq!(filter_expr(&Value::Null), "is.null");
    }

    #[test]
    fn test_filter_pairs_keep_field_names() {
        let pairs = filter_pairs(&filters([("event_id", json!(9)), ("user_id", json!("u-1"))]));
        assert!(pairs.contains(&("event_id".to_string(), "eq.9".to_string())));
        assert!(pairs.contains(&("user_id".to_string(), "eq.u-1".to_string())));
    }

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let store = RestStore::new(&RestStoreConfig {
            url: "https://example.co/rest/v1/".to_string(),
            api_key: "key".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(store.table_url("users"), "https://example.co/rest/v1/users");
    }
}
