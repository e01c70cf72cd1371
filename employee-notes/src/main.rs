mod config;

mod app;
mod backend;
mod ctx;
mod db;
mod debug;
mod errors;
mod notes;
mod openapi;
mod state;
mod topics;
mod views;

use std::net::SocketAddr;

use aide::axum::ApiRouter;
use app::AppParams;
use axum::{body::Body, http::HeaderName};
pub use config::config;
pub use errors::{Error, Result};
use notes::{FeedOptions, StatsDefault};
use tokio::net::TcpListener;
use topics::TopicsClient;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{self, TraceLayer},
};
use tracing_subscriber::prelude::*;
use views::Views;

const REQUEST_ID_HEADER: &str = "x-request-id";

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "employee_notes=debug,tower_http=debug,axum::rejection=trace".into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
            .ok();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(false),
            )
            .try_init()
            .ok();
    }
}

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = config();

    init_tracing(config.log_json);

    let backend = backend::from_config(config).await?;
    let views = Views::load().map_err(|err| Error::Unexpected(format!("failed to load templates: {err}")))?;

    let options = FeedOptions {
        demo_notes: config.demo_notes,
        missing_stats: if config.random_missing_stats {
            StatsDefault::Random
        } else {
            StatsDefault::Zero
        },
    };

    let (app, _) = app::create(AppParams {
        backend,
        options,
        views,
        topics: TopicsClient::new(&config.topics_url),
        router: |state| {
            ApiRouter::new()
                .merge(notes::router(state.clone()))
                .merge(topics::router(state.clone()))
                .merge(debug::router(state))
        },
    })
    .await?;

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let app = app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &axum::http::Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(REQUEST_ID_HEADER)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default();
                        tracing::span!(
                            tracing::Level::DEBUG,
                            "request",
                            method = %request.method(),
                            request_id = request_id,
                            uri = %request.uri(),
                        )
                    })
                    .on_request(trace::DefaultOnRequest::new())
                    .on_response(trace::DefaultOnResponse::new().include_headers(false))
                    .on_failure(trace::DefaultOnFailure::new()),
            )
            .layer(PropagateRequestIdLayer::new(request_id)),
    );

    let port = config.port;
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;

    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
