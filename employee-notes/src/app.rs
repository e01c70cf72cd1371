use aide::scalar::Scalar;
use axum::{middleware, response::IntoResponse, routing::get, Extension, Json, Router};
use std::sync::Arc;
use tower::ServiceBuilder;

use rand::Rng;
use serde_json::json;

use crate::{
    backend::SharedBackend,
    config,
    errors::{self, on_error, ErrorResponseDocs},
    notes::FeedOptions,
    openapi::{
        self,
        aide::axum::{ApiRouter, IntoApiResponse},
        OpenApi,
    },
    state::AppState,
    topics::TopicsClient,
    views::Views,
    Error,
};

pub struct AppParams<Router>
where
    Router: FnOnce(AppState) -> ApiRouter,
{
    pub backend: SharedBackend,
    pub options: FeedOptions,
    pub views: Views,
    pub topics: TopicsClient,
    pub router: Router,
}

pub async fn create<R>(
    AppParams {
        backend,
        options,
        views,
        topics,
        router,
    }: AppParams<R>,
) -> errors::Result<(Router, OpenApi)>
where
    R: FnOnce(AppState) -> ApiRouter,
{
    let mut api = OpenApi::default();

    let state = AppState {
        backend: backend.clone(),
        options,
        views,
        topics,
    };

    let docs_router = axum::Router::new()
        .route(
            "/__docs__",
            get(Scalar::new("/__docs__/spec.json")
                .with_title("Employee Notes API")
                .axum_handler()),
        )
        .route("/__docs__/spec.json", get(serve_docs));

    let app = ApiRouter::new()
        .route("/__version__", get(version))
        .route("/__heartbeat__", get(heartbeat))
        .route("/__lbheartbeat__", get(lbheartbeat))
        .merge(docs_router)
        .merge(router(state))
        .finish_api_with(&mut api, |t| {
            t.title("Employee Notes")
                .default_response::<openapi::Json<ErrorResponseDocs>>()
        })
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(Extension(backend))
                .layer(Extension(options))
                .layer(Extension(Arc::new(api.clone())))
                .layer(middleware::from_fn(on_error)),
        );

    Ok((app, api))
}

async fn version() -> impl IntoResponse {
    let config = config::config();
    Json(json!({
        "source" : config.source,
        "version": config.app_version.as_deref().unwrap_or(&config.version),
        "commit" : config.git_commit,
        "build"  : config.pipeline_id
    }))
}

async fn heartbeat() -> impl IntoResponse {
    let mut rng = rand::thread_rng();
    let random: u32 = rng.gen_range(0..=10000);

    Json(json!({
        "status" : "ok",
        "random": random,
    }))
}

async fn lbheartbeat() -> impl IntoResponse {
    ""
}

async fn not_found() -> Error {
    Error::NotFound("Page not found".into())
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
    openapi::Json(api.as_ref()).into_response()
}
