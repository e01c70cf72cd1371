//! Topics shown in the navigation menu, hidden until their schedule opens.

mod client;
mod routes;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

pub use client::TopicsClient;
pub use routes::router;

use crate::backend::{Backend, BackendError, Row, SelectQuery};

pub const SCHEDULES_TABLE: &str = "schedules";
pub const SCHEDULE_ORGANIZATIONS_TABLE: &str = "schedule_organizations";

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub topic_id: String,
    /// `None` when the stored time could not be read.
    pub schedule_at: Option<DateTime<Utc>>,
}

impl Schedule {
    fn from_row(row: &Row) -> Option<Self> {
        let topic_id = row.get("topic_id").and_then(id_string)?;
        let schedule_at = match row.get("schedule_at") {
            None | Some(Value::Null) => Utc.timestamp_millis_opt(0).single(),
            Some(value) => parse_time(value),
        };
        Some(Self { topic_id, schedule_at })
    }
}

/// Ids compare by their string form, so `7` and `"7"` are the same topic.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Milliseconds since the epoch, or an RFC 3339 / SQLite datetime string.
fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|t| t.and_utc())
            }),
        _ => None,
    }
}

fn organization_value(organization_id: &str) -> Value {
    organization_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(organization_id))
}

/// Schedules attached to the organization, through `schedule_organizations.parent_id`.
pub async fn schedules_for(backend: &dyn Backend, organization_id: &str) -> Result<Vec<Schedule>, BackendError> {
    let links = backend
        .select(&SelectQuery::table(SCHEDULE_ORGANIZATIONS_TABLE).eq("organization_id", organization_value(organization_id)))
        .await?;

    let parents = links
        .iter()
        .filter_map(|row| row.get("parent_id").cloned())
        .filter(|id| !id.is_null())
        .collect::<Vec<_>>();

    if parents.is_empty() {
        return Ok(Vec::new());
    }

    let rows = backend
        .select(&SelectQuery::table(SCHEDULES_TABLE).is_in("id", parents))
        .await?;

    Ok(rows.iter().filter_map(Schedule::from_row).collect())
}

/// Keeps topics without a schedule and topics whose first schedule is in the past.
/// Without any schedule every topic is visible.
pub fn visible_topics(docs: Vec<Value>, schedules: &[Schedule], now: DateTime<Utc>) -> Vec<Value> {
    if schedules.is_empty() {
        return docs;
    }

    docs.into_iter()
        .filter(|topic| {
            let id = topic.get("id").and_then(id_string);
            match schedules.iter().find(|s| Some(&s.topic_id) == id.as_ref()) {
                Some(schedule) => schedule.schedule_at.is_some_and(|at| at < now),
                None => true,
            }
        })
        .collect()
}
