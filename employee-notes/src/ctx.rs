use axum::extract::Extension;
use axum_macros::FromRequestParts;

use crate::{backend::SharedBackend, notes::FeedOptions};

/// Request-scoped handles shared by every handler.
#[derive(Clone, FromRequestParts)]
pub struct BaseParams {
    #[from_request(via(Extension))]
    pub backend: SharedBackend,
    #[from_request(via(Extension))]
    pub options: FeedOptions,
}

impl BaseParams {
    pub fn new(backend: SharedBackend, options: FeedOptions) -> Self {
        Self { backend, options }
    }
}
