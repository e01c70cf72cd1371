//! Client for the managed backend's PostgREST-compatible REST interface.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{Backend, BackendError, Filter, Row, SelectQuery};

pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Error body returned by the backend for rejected queries.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl RestBackend {
    /// * `base_url` - project URL, e.g. `https://project.example.co`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn parse_error(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or(body);

        BackendError::Api { status, message }
    }
}

/// Query string for a select, in the backend's filter syntax.
pub(crate) fn query_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    for filter in &query.filters {
        match filter {
            Filter::Eq(column, value) => params.push((column.clone(), format!("eq.{}", literal(value)))),
            Filter::In(column, values) => {
                let values = values.iter().map(list_item).collect::<Vec<_>>().join(",");
                params.push((column.clone(), format!("in.({values})")));
            }
        }
    }

    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Strings inside `in.(..)` are double quoted so `,`, `(` and `)` stay part of the value.
fn list_item(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        other => other.to_string(),
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, BackendError> {
        let response = self
            .client
            .get(self.table_url(&query.table))
            .query(&query_params(query))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        let rows = response.json::<Vec<Row>>().await?;
        tracing::debug!(table = %query.table, rows = rows.len(), "rest select");
        Ok(rows)
    }

    fn location(&self) -> String {
        self.base_url.clone()
    }
}
