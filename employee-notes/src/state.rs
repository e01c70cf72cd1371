use axum::extract::FromRef;

use crate::{backend::SharedBackend, notes::FeedOptions, views::Views};

#[derive(FromRef, Clone)]
pub struct AppState {
    pub backend: SharedBackend,
    pub options: FeedOptions,
    pub views: Views,
    pub topics: crate::topics::TopicsClient,
}
