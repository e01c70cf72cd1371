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
    views::Views,
};
use axum::response::IntoResponse;

use super::{
    filter::FilterState,
    handlers::{self, views::NOTES_PATH},
};

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/api/v1/notes", get(find_notes))
        .route(NOTES_PATH, axum::routing::get(notes_page))
        .with_state(state)
}

async fn find_notes(Query(filters): Query<FilterState>, NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::find_notes(filters, base).await.map(Json)
}

async fn notes_page(view: Views, base: BaseParams, Query(filters): Query<FilterState>) -> impl IntoResponse {
    let page = handlers::views::notes_page(filters, base).await;
    view.response("notes.html", page)
}
