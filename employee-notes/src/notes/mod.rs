mod card;
mod demo;
mod feed;
mod filter;
mod handlers;
mod model;
mod routes;
mod validate;

pub use card::{render, Card, CardAction};
pub use feed::{FeedOptions, FeedState, FeedStatus, NotesFeed, NOTES_TABLE};
pub use filter::{EmptyState, FilterState, Toggle};
pub use model::{effective_category, Note, NoteType};
pub use validate::{validate_batch, StatsDefault};

use crate::{openapi::aide::axum::ApiRouter, state::AppState};

pub fn add_templates(env: &mut minijinja::Environment<'static>) -> Result<(), minijinja::Error> {
    env.add_template("notes.html", include_str!("views/notes.html"))?;
    env.add_template("note-card.html", include_str!("views/note-card.html"))?;
    Ok(())
}

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new().merge(routes::router(state))
}
