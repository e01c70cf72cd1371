//! Diagnostic endpoints reporting what the configured backend can see.

use axum::{http::StatusCode, response::IntoResponse};
use chrono::Utc;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    backend::{Backend, SelectQuery},
    ctx::BaseParams,
    notes::NOTES_TABLE,
    openapi::{
        aide::{
            axum::{routing::get, ApiRouter, IntoApiResponse},
            NoApi,
        },
        Json,
    },
    state::AppState,
};

/// Candidate table names, including the spellings older deployments used.
pub const PROBED_TABLES: [&str; 5] = ["notes", "Notes", "profiles", "users", "auth.users"];

const TEST_NOTES_LIMIT: usize = 5;

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableProbe {
    pub table: String,
    pub exists: bool,
    pub error: Option<String>,
    pub sample_data: Option<Value>,
    pub data_count: usize,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebugTables {
    pub table_tests: Vec<TableProbe>,
    pub timestamp: String,
    pub backend: String,
}

pub async fn probe_table(backend: &dyn Backend, table: &str) -> TableProbe {
    match backend.select(&SelectQuery::table(table).limit(1)).await {
        Ok(rows) => TableProbe {
            table: table.into(),
            exists: true,
            error: None,
            data_count: rows.len(),
            sample_data: rows.into_iter().next().map(Value::Object),
        },
        Err(error) => TableProbe {
            table: table.into(),
            exists: false,
            error: Some(error.to_string()),
            sample_data: None,
            data_count: 0,
        },
    }
}

pub async fn debug_tables(backend: &dyn Backend) -> DebugTables {
    let mut table_tests = Vec::with_capacity(PROBED_TABLES.len());
    for table in PROBED_TABLES {
        table_tests.push(probe_table(backend, table).await);
    }

    DebugTables {
        table_tests,
        timestamp: Utc::now().to_rfc3339(),
        backend: backend.location(),
    }
}

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/api/debug-tables", get(find_tables))
        .route("/api/test-notes", axum::routing::get(test_notes))
        .with_state(state)
}

async fn find_tables(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    Json(debug_tables(base.backend.as_ref()).await)
}

/// A handful of raw note rows, straight from the backend.
async fn test_notes(base: BaseParams) -> impl IntoResponse {
    let query = SelectQuery::table(NOTES_TABLE).limit(TEST_NOTES_LIMIT);

    match base.backend.select(&query).await {
        Ok(notes) => axum::Json(json!({
            "success": true,
            "count": notes.len(),
            "notes": notes,
            "timestamp": Utc::now().to_rfc3339(),
        }))
        .into_response(),
        Err(error) => {
            tracing::error!(%error, "test notes query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({
                    "success": false,
                    "error": error.to_string(),
                })),
            )
                .into_response()
        }
    }
}
