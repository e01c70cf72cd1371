use axum::extract::State;
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    ctx::BaseParams,
    openapi::{
        aide::{
            axum::{routing::get, ApiRouter, IntoApiResponse},
            NoApi,
        },
        Json, Query,
    },
    state::AppState,
};

use super::{schedules_for, visible_topics, TopicsClient};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TopicsQuery {
    pub organization_id: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TopicsResponse {
    pub docs: Vec<Value>,
}

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/api/menu/topics", get(menu_topics))
        .with_state(state)
}

async fn menu_topics(
    State(topics): State<TopicsClient>,
    NoApi(base): NoApi<BaseParams>,
    Query(query): Query<TopicsQuery>,
) -> impl IntoApiResponse {
    let docs = match topics.fetch().await {
        Ok(docs) => docs,
        Err(error) => {
            tracing::error!(%error, url = topics.url(), "error fetching topics");
            return Json(TopicsResponse { docs: Vec::new() });
        }
    };

    let schedules = match query.organization_id.as_deref().filter(|id| !id.is_empty()) {
        Some(organization_id) => schedules_for(base.backend.as_ref(), organization_id)
            .await
            .unwrap_or_else(|error| {
                tracing::warn!(%error, organization_id, "could not load schedules, showing every topic");
                Vec::new()
            }),
        None => Vec::new(),
    };

    Json(TopicsResponse {
        docs: visible_topics(docs, &schedules, Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::routing::get;
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;
    use crate::{
        backend::MemoryBackend,
        errors::Result,
        notes::FeedOptions,
        topics::{SCHEDULES_TABLE, SCHEDULE_ORGANIZATIONS_TABLE},
    };

    /// Serves a fixed topics list on a random local port.
    async fn topics_service() -> String {
        let app = axum::Router::new().route(
            "/api/topics",
            get(|| async {
                axum::Json(json!({
                    "docs": [
                        { "id": 1, "title": "Understanding History" },
                        { "id": 2, "title": "Workplace Reconciliation" },
                        { "id": 3, "title": "Treaties" }
                    ]
                }))
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{addr}/api/topics")
    }

    fn backend() -> Arc<MemoryBackend> {
        Arc::new(
            MemoryBackend::new()
                .with_table(
                    SCHEDULE_ORGANIZATIONS_TABLE,
                    vec![
                        json!({ "id": 1, "parent_id": 10, "organization_id": 7 }),
                        json!({ "id": 2, "parent_id": 11, "organization_id": 7 }),
                    ],
                )
                .with_table(
                    SCHEDULES_TABLE,
                    vec![
                        json!({ "id": 10, "topic_id": "1", "schedule_at": "2020-01-01T00:00:00Z" }),
                        json!({ "id": 11, "topic_id": "2", "schedule_at": "2999-01-01T00:00:00Z" }),
                    ],
                ),
        )
    }

    async fn server(backend: Arc<MemoryBackend>, url: String) -> Result<axum_test::TestServer> {
        crate::tests::test_server(backend, FeedOptions::default(), move |state| {
            router(AppState {
                topics: TopicsClient::new(url),
                ..state
            })
        })
        .await
    }

    fn titles(body: &Value) -> Vec<&str> {
        body["docs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["title"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn scheduled_topics_open_once_their_time_has_passed() -> Result<()> {
        let server = server(backend(), topics_service().await).await?;
        let body = server
            .get("/api/menu/topics")
            .add_query_param("organization_id", "7")
            .await
            .json::<Value>();

        assert_eq!(titles(&body), vec!["Understanding History", "Treaties"]);
        Ok(())
    }

    #[tokio::test]
    async fn without_an_organization_every_topic_shows() -> Result<()> {
        let server = server(backend(), topics_service().await).await?;
        let body = server.get("/api/menu/topics").await.json::<Value>();

        assert_eq!(body["docs"].as_array().map(Vec::len), Some(3));
        Ok(())
    }

    #[tokio::test]
    async fn schedule_failures_show_every_topic() -> Result<()> {
        let backend = backend();
        backend.fail_next("permission denied for table schedule_organizations");

        let server = server(backend, topics_service().await).await?;
        let body = server.get("/api/menu/topics?organization_id=7").await.json::<Value>();

        assert_eq!(body["docs"].as_array().map(Vec::len), Some(3));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_topics_service_yields_an_empty_menu() -> Result<()> {
        let server = server(backend(), "http://127.0.0.1:1/api/topics".into()).await?;
        let body = server.get("/api/menu/topics?organization_id=7").await.json::<Value>();

        assert_eq!(body, json!({ "docs": [] }));
        Ok(())
    }
}
