//! Local SQLite stand-in for the managed backend, with the same tables.

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use sea_query::{Alias, Asterisk, Expr, Order, Query, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;
use serde_json::{Number, Value};

use super::{Backend, BackendError, Filter, Row, SelectQuery};
use crate::db::{self, DB};

pub struct SqliteBackend {
    db: DB,
    path: String,
}

impl SqliteBackend {
    pub fn new(db: DB, path: impl Into<String>) -> Self {
        Self { db, path: path.into() }
    }
}

fn sql_value(value: &Value) -> sea_query::Value {
    match value {
        Value::Null => sea_query::Value::String(None),
        Value::Bool(b) => (*b).into(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.into(),
            None => n.as_f64().unwrap_or_default().into(),
        },
        Value::String(s) => s.clone().into(),
        other => other.to_string().into(),
    }
}

fn build_sql(query: &SelectQuery) -> (String, sea_query_rusqlite::RusqliteValues) {
    let mut select = Query::select();
    select.column(Asterisk).from(Alias::new(query.table.as_str()));

    for filter in &query.filters {
        match filter {
            Filter::Eq(column, value) => {
                select.and_where(Expr::col(Alias::new(column.as_str())).eq(sql_value(value)));
            }
            Filter::In(column, values) => {
                select.and_where(Expr::col(Alias::new(column.as_str())).is_in(values.iter().map(sql_value)));
            }
        }
    }

    if let Some(order) = &query.order {
        let direction = if order.descending { Order::Desc } else { Order::Asc };
        select.order_by(Alias::new(order.column.as_str()), direction);
    }

    if let Some(limit) = query.limit {
        select.limit(limit as u64);
    }

    select.build_rusqlite(SqliteQueryBuilder)
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, BackendError> {
        let (sql, values) = build_sql(query);
        let table = query.table.clone();

        let rows = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let columns = stmt
                    .column_names()
                    .into_iter()
                    .map(String::from)
                    .collect::<Vec<_>>();

                let rows = stmt
                    .query_map(&*values.as_params(), |row| {
                        let mut record = Row::new();
                        for (index, column) in columns.iter().enumerate() {
                            record.insert(column.clone(), json_value(row.get_ref(index)?));
                        }
                        Ok(record)
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
            .map_err(db::Error::from)?;

        tracing::debug!(%table, rows = rows.len(), "sqlite select");
        Ok(rows)
    }

    fn location(&self) -> String {
        format!("sqlite://{}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::init_test_db;

    async fn backend() -> SqliteBackend {
        let db = init_test_db().await.unwrap();
        db.call(|conn| {
            conn.execute_batch(
                r#"
                INSERT INTO notes (note_content, employee_id, is_public, created_at)
                VALUES ('first', '018f6146-32f4-7948-8289-cfb5cdb2b2af', 1, '2024-01-01T00:00:00.000Z');
                INSERT INTO notes (note_content, employee_id, is_public, note_type, created_at)
                VALUES ('second', '018f6146-32f4-7948-8289-cfb5cdb2b2af', 0, 'comment', '2024-02-01T00:00:00.000Z');
                "#,
            )?;
            Ok(())
        })
        .await
        .unwrap();
        SqliteBackend::new(db, ":memory:")
    }

    #[tokio::test]
    async fn rows_come_back_as_json_objects() {
        let backend = backend().await;

        let rows = backend
            .select(&SelectQuery::table("notes").order_desc("created_at"))
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("note_content"), Some(&json!("second")));
        assert_eq!(rows[0].get("note_type"), Some(&json!("comment")));
        assert_eq!(rows[1].get("is_public"), Some(&json!(1)));
        assert_eq!(rows[1].get("address"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn filters_and_limits_are_applied() {
        let backend = backend().await;

        let rows = backend
            .select(&SelectQuery::table("notes").eq("note_content", "first"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let rows = backend
            .select(&SelectQuery::table("notes").is_in("id", vec![json!(1), json!(2)]).limit(1))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn missing_tables_are_errors() {
        let backend = backend().await;
        let err = backend.select(&SelectQuery::table("auth.users")).await.unwrap_err();
        assert!(err.to_string().contains("no such table"), "{err}");
    }
}
