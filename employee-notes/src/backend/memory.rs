use std::{
    cmp::Ordering,
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{self, AtomicUsize},
        Mutex,
    },
};

use async_trait::async_trait;
use serde_json::Value;

use super::{Backend, BackendError, Filter, Row, SelectQuery};

/// In-process tables. Failures can be queued to script backend outages.
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    failures: Mutex<VecDeque<String>>,
    selects: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the rows of `table`. Non-object values are ignored.
    pub fn with_table(self, table: impl Into<String>, rows: Vec<Value>) -> Self {
        self.set_table(table, rows);
        self
    }

    pub fn set_table(&self, table: impl Into<String>, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect();
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(table.into(), rows);
    }

    /// The next select fails with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(message.into());
    }

    pub fn select_count(&self) -> usize {
        self.selects.load(atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, BackendError> {
        self.selects.fetch_add(1, atomic::Ordering::SeqCst);

        if let Some(message) = self.failures.lock().unwrap_or_else(|e| e.into_inner()).pop_front() {
            return Err(BackendError::Api { status: 500, message });
        }

        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let rows = tables.get(&query.table).ok_or_else(|| BackendError::Api {
            status: 404,
            message: format!("relation \"{}\" does not exist", query.table),
        })?;

        let mut rows = rows
            .iter()
            .filter(|row| query.filters.iter().all(|filter| matches_filter(row, filter)))
            .cloned()
            .collect::<Vec<_>>();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(&order.column), b.get(&order.column));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    fn location(&self) -> String {
        "memory".into()
    }
}

fn matches_filter(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, value) => row.get(column) == Some(value),
        Filter::In(column, values) => row.get(column).is_some_and(|v| values.contains(v)),
    }
}

/// Missing and null values sort after everything else, so they lead a
/// descending order the way Postgres does.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn backend() -> MemoryBackend {
        MemoryBackend::new().with_table(
            "notes",
            vec![
                json!({ "id": 1, "created_at": "2024-01-01T00:00:00Z", "topic_id": 3 }),
                json!({ "id": 2, "created_at": "2024-03-01T00:00:00Z", "topic_id": 4 }),
                json!({ "id": 3, "created_at": "2024-02-01T00:00:00Z", "topic_id": 3 }),
            ],
        )
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().filter_map(|r| r.get("id").and_then(Value::as_i64)).collect()
    }

    #[tokio::test]
    async fn orders_filters_and_limits() {
        let backend = backend();

        let rows = backend
            .select(&SelectQuery::table("notes").order_desc("created_at"))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![2, 3, 1]);

        let rows = backend
            .select(&SelectQuery::table("notes").eq("topic_id", 3).order_asc("id").limit(1))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![1]);

        let rows = backend
            .select(&SelectQuery::table("notes").is_in("id", vec![json!(2), json!(3)]))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![2, 3]);
    }

    #[tokio::test]
    async fn nulls_lead_descending_and_trail_ascending() {
        let backend = backend();
        backend.set_table(
            "notes",
            vec![
                json!({ "id": 1, "created_at": "2024-01-01T00:00:00Z" }),
                json!({ "id": 2 }),
                json!({ "id": 3, "created_at": null }),
                json!({ "id": 4, "created_at": "2024-02-01T00:00:00Z" }),
            ],
        );

        let rows = backend
            .select(&SelectQuery::table("notes").order_desc("created_at"))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![2, 3, 4, 1]);

        let rows = backend
            .select(&SelectQuery::table("notes").order_asc("created_at"))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![1, 4, 2, 3]);
    }

    #[tokio::test]
    async fn unknown_tables_are_reported() {
        let err = backend().select(&SelectQuery::table("users")).await.unwrap_err();
        assert_eq!(err.to_string(), "relation \"users\" does not exist");
    }

    #[tokio::test]
    async fn scripted_failures_apply_once() {
        let backend = backend();
        backend.fail_next("Database connection failed");

        let err = backend.select(&SelectQuery::table("notes")).await.unwrap_err();
        assert_eq!(err.to_string(), "Database connection failed");
        assert!(backend.select(&SelectQuery::table("notes")).await.is_ok());
        assert_eq!(backend.select_count(), 2);
    }
}
