use crate::infrastructure::error::StoreError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

pub const PARTITION_COLUMN: &str = "user_id";
pub const ID_COLUMN: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOrder {
    pub column: &'static str,
    pub ascending: bool,
}

impl ListOrder {
    pub const fn created_descending() -> Self {
        Self {
            column: "created_at",
            ascending: false,
        }
    }

    fn as_query_value(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{direction}", self.column)
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_rows(
        &self,
        access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        order: ListOrder,
    ) -> Result<Vec<Value>, StoreError>;

    async fn insert_row(
        &self,
        access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        row: Value,
    ) -> Result<Value, StoreError>;

    async fn update_row(
        &self,
        access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        row_id: &str,
        patch: Value,
    ) -> Result<Value, StoreError>;

    async fn delete_row(
        &self,
        access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        row_id: &str,
    ) -> Result<(), StoreError>;

    async fn upsert_row(
        &self,
        access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        row: Value,
    ) -> Result<Value, StoreError>;
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub base_url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct ReqwestSupabaseStore {
    client: Client,
    config: SupabaseConfig,
}

impl ReqwestSupabaseStore {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn ensure_non_empty(value: &str, field: &str) -> Result<(), StoreError> {
        if value.trim().is_empty() {
            return Err(StoreError::InvalidInput(format!(
                "{field} must not be empty"
            )));
        }
        Ok(())
    }

    fn backend_http_error(status: reqwest::StatusCode, body: &str) -> StoreError {
        let message = if body.trim().is_empty() {
            format!("supabase api error: http {}", status.as_u16())
        } else {
            format!(
                "supabase api error: http {}; body={body}",
                status.as_u16()
            )
        };
        StoreError::Backend(message)
    }

    fn table_endpoint(&self, collection: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|error| StoreError::InvalidConfig(format!("invalid supabase base url: {error}")))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StoreError::InvalidConfig("supabase base URL cannot be a base".to_string())
            })?;
            segments.push("rest");
            segments.push("v1");
            segments.push(collection);
        }
        Ok(url)
    }

    fn bearer_token<'a>(&'a self, access_token: Option<&'a str>) -> &'a str {
        access_token
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(&self.config.anon_key)
    }

    async fn read_body(
        response: reqwest::Response,
        context: &str,
    ) -> Result<(reqwest::StatusCode, String), StoreError> {
        let status = response.status();
        let body = response.text().await.map_err(|error| {
            StoreError::Backend(format!("failed reading {context} response: {error}"))
        })?;
        Ok((status, body))
    }

    fn parse_rows(body: &str, context: &str) -> Result<Vec<Value>, StoreError> {
        let parsed: Value = serde_json::from_str(body).map_err(|error| {
            StoreError::Backend(format!("invalid {context} payload: {error}; body={body}"))
        })?;
        match parsed {
            Value::Array(rows) => Ok(rows),
            other => Ok(vec![other]),
        }
    }

    fn single_row(body: &str, context: &str) -> Result<Value, StoreError> {
        Self::parse_rows(body, context)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                StoreError::Backend(format!("{context} response did not include a row"))
            })
    }
}

#[async_trait]
impl RemoteStore for ReqwestSupabaseStore {
    async fn list_rows(
        &self,
        access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        order: ListOrder,
    ) -> Result<Vec<Value>, StoreError> {
        Self::ensure_non_empty(collection, "collection")?;
        Self::ensure_non_empty(partition_key, "partition key")?;

        let endpoint = self.table_endpoint(collection)?;
        let response = self
            .client
            .get(endpoint)
            .query(&[
                (PARTITION_COLUMN, format!("eq.{partition_key}")),
                ("order", order.as_query_value()),
                ("select", "*".to_string()),
            ])
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer_token(access_token))
            .send()
            .await
            .map_err(|error| {
                StoreError::Backend(format!("network error while listing {collection}: {error}"))
            })?;

        let (status, body) = Self::read_body(response, "list").await?;
        if !status.is_success() {
            return Err(Self::backend_http_error(status, &body));
        }
        Self::parse_rows(&body, "list")
    }

    async fn insert_row(
        &self,
        access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        row: Value,
    ) -> Result<Value, StoreError> {
        Self::ensure_non_empty(collection, "collection")?;
        Self::ensure_non_empty(partition_key, "partition key")?;

        let endpoint = self.table_endpoint(collection)?;
        let response = self
            .client
            .post(endpoint)
            .header("apikey", &self.config.anon_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer_token(access_token))
            .json(&row)
            .send()
            .await
            .map_err(|error| {
                StoreError::Backend(format!(
                    "network error while inserting into {collection}: {error}"
                ))
            })?;

        let (status, body) = Self::read_body(response, "insert").await?;
        if !status.is_success() {
            return Err(Self::backend_http_error(status, &body));
        }
        Self::single_row(&body, "insert")
    }

    async fn update_row(
        &self,
        access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        row_id: &str,
        patch: Value,
    ) -> Result<Value, StoreError> {
        Self::ensure_non_empty(collection, "collection")?;
        Self::ensure_non_empty(partition_key, "partition key")?;
        Self::ensure_non_empty(row_id, "row id")?;

        let endpoint = self.table_endpoint(collection)?;
        let response = self
            .client
            .patch(endpoint)
            .query(&[
                (ID_COLUMN, format!("eq.{row_id}")),
                (PARTITION_COLUMN, format!("eq.{partition_key}")),
            ])
            .header("apikey", &self.config.anon_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer_token(access_token))
            .json(&patch)
            .send()
            .await
            .map_err(|error| {
                StoreError::Backend(format!(
                    "network error while updating {collection}: {error}"
                ))
            })?;

        let (status, body) = Self::read_body(response, "update").await?;
        if !status.is_success() {
            return Err(Self::backend_http_error(status, &body));
        }
        Self::single_row(&body, "update")
    }

    async fn delete_row(
        &self,
        access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        row_id: &str,
    ) -> Result<(), StoreError> {
        Self::ensure_non_empty(collection, "collection")?;
        Self::ensure_non_empty(partition_key, "partition key")?;
        Self::ensure_non_empty(row_id, "row id")?;

        let endpoint = self.table_endpoint(collection)?;
        let response = self
            .client
            .delete(endpoint)
            .query(&[
                (ID_COLUMN, format!("eq.{row_id}")),
                (PARTITION_COLUMN, format!("eq.{partition_key}")),
            ])
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer_token(access_token))
            .send()
            .await
            .map_err(|error| {
                StoreError::Backend(format!(
                    "network error while deleting from {collection}: {error}"
                ))
            })?;

        let (status, body) = Self::read_body(response, "delete").await?;
        if !status.is_success() {
            return Err(Self::backend_http_error(status, &body));
        }
        Ok(())
    }

    async fn upsert_row(
        &self,
        access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        row: Value,
    ) -> Result<Value, StoreError> {
        Self::ensure_non_empty(collection, "collection")?;
        Self::ensure_non_empty(partition_key, "partition key")?;

        let endpoint = self.table_endpoint(collection)?;
        let response = self
            .client
            .post(endpoint)
            .header("apikey", &self.config.anon_key)
            .header(
                "Prefer",
                "return=representation,resolution=merge-duplicates",
            )
            .bearer_auth(self.bearer_token(access_token))
            .json(&row)
            .send()
            .await
            .map_err(|error| {
                StoreError::Backend(format!(
                    "network error while upserting into {collection}: {error}"
                ))
            })?;

        let (status, body) = Self::read_body(response, "upsert").await?;
        if !status.is_success() {
            return Err(Self::backend_http_error(status, &body));
        }
        Self::single_row(&body, "upsert")
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
}

impl InMemoryRemoteStore {
    fn lock_collections(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Value>>>, StoreError> {
        self.collections.lock().map_err(|error| {
            StoreError::Backend(format!("in-memory store lock poisoned: {error}"))
        })
    }

    fn row_matches(row: &Value, partition_key: &str) -> bool {
        row.get(PARTITION_COLUMN)
            .and_then(Value::as_str)
            .map(|value| value == partition_key)
            .unwrap_or(false)
    }

    fn row_id(row: &Value) -> Option<&str> {
        row.get(ID_COLUMN).and_then(Value::as_str)
    }

    fn sort_rows(rows: &mut [Value], order: ListOrder) {
        rows.sort_by(|left, right| {
            let left_key = left
                .get(order.column)
                .and_then(Value::as_str)
                .unwrap_or_default();
            let right_key = right
                .get(order.column)
                .and_then(Value::as_str)
                .unwrap_or_default();
            if order.ascending {
                left_key.cmp(right_key)
            } else {
                right_key.cmp(left_key)
            }
        });
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn list_rows(
        &self,
        _access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        order: ListOrder,
    ) -> Result<Vec<Value>, StoreError> {
        let collections = self.lock_collections()?;
        let mut rows: Vec<Value> = collections
            .get(collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| Self::row_matches(row, partition_key))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Self::sort_rows(&mut rows, order);
        Ok(rows)
    }

    async fn insert_row(
        &self,
        _access_token: Option<&str>,
        collection: &str,
        _partition_key: &str,
        row: Value,
    ) -> Result<Value, StoreError> {
        let mut collections = self.lock_collections()?;
        let rows = collections.entry(collection.to_string()).or_default();
        if let Some(row_id) = Self::row_id(&row) {
            if rows.iter().any(|existing| Self::row_id(existing) == Some(row_id)) {
                return Err(StoreError::Backend(format!(
                    "duplicate key value violates unique constraint: {row_id}"
                )));
            }
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update_row(
        &self,
        _access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        row_id: &str,
        patch: Value,
    ) -> Result<Value, StoreError> {
        let mut collections = self.lock_collections()?;
        let rows = collections.entry(collection.to_string()).or_default();
        let row = rows
            .iter_mut()
            .find(|row| Self::row_id(row) == Some(row_id) && Self::row_matches(row, partition_key))
            .ok_or_else(|| StoreError::Backend(format!("row not found: {row_id}")))?;

        let Some(patch_object) = patch.as_object() else {
            return Err(StoreError::InvalidInput(
                "patch must be a JSON object".to_string(),
            ));
        };
        let Some(row_object) = row.as_object_mut() else {
            return Err(StoreError::Backend(format!(
                "stored row is not an object: {row_id}"
            )));
        };
        for (key, value) in patch_object {
            row_object.insert(key.clone(), value.clone());
        }
        Ok(row.clone())
    }

    async fn delete_row(
        &self,
        _access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        row_id: &str,
    ) -> Result<(), StoreError> {
        let mut collections = self.lock_collections()?;
        if let Some(rows) = collections.get_mut(collection) {
            rows.retain(|row| {
                !(Self::row_id(row) == Some(row_id) && Self::row_matches(row, partition_key))
            });
        }
        Ok(())
    }

    async fn upsert_row(
        &self,
        _access_token: Option<&str>,
        collection: &str,
        partition_key: &str,
        row: Value,
    ) -> Result<Value, StoreError> {
        let mut collections = self.lock_collections()?;
        let rows = collections.entry(collection.to_string()).or_default();
        if let Some(existing) = rows
            .iter_mut()
            .find(|existing| Self::row_matches(existing, partition_key))
        {
            *existing = row.clone();
        } else {
            rows.push(row.clone());
        }
        Ok(row)
    }
}
