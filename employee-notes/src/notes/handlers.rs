use schemars::JsonSchema;
use serde::Serialize;

use crate::{ctx::BaseParams, Error, Result};

use super::{
    card::{render, render_as, Card},
    feed::NotesFeed,
    filter::{EmptyState, FilterState, FilteredNotes, Toggle},
    model::{Note, NoteType},
};

#[derive(Debug, Serialize, JsonSchema)]
pub struct NoteView {
    pub note: Note,
    pub category: NoteType,
    pub card: Card,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct FindNotesResponse {
    pub filters: FilterState,
    pub total: usize,
    pub filtered: usize,
    pub empty_state: Option<EmptyState>,
    pub results: Vec<NoteView>,
}

/// One feed session for one request: fetch once, then filter.
pub async fn load_feed(filters: FilterState, BaseParams { backend, options }: BaseParams) -> NotesFeed {
    let mut feed = NotesFeed::new(options).with_filters(filters);
    feed.load(backend.as_ref()).await;
    feed
}

fn note_views(filtered: &FilteredNotes<'_>) -> Vec<NoteView> {
    filtered
        .notes
        .iter()
        .map(|note| {
            let category = note.category();
            NoteView {
                note: (*note).clone(),
                category,
                card: render_as(note, category),
            }
        })
        .collect()
}

pub async fn find_notes(filters: FilterState, base: BaseParams) -> Result<FindNotesResponse> {
    let feed = load_feed(filters, base).await;

    if let Some(message) = feed.error() {
        return Err(Error::Fetch(message.to_string()));
    }

    let filtered = feed
        .visible()
        .ok_or_else(|| Error::Unexpected("notes feed did not settle".into()))?;

    Ok(FindNotesResponse {
        filters: feed.filters().clone(),
        total: filtered.total,
        filtered: filtered.len(),
        empty_state: filtered.empty_state(),
        results: note_views(&filtered),
    })
}

pub mod views {
    use serde::Serialize;

    use super::*;

    pub const NOTES_PATH: &str = "/emp/notes";

    #[derive(Debug, Serialize)]
    pub struct ToggleLink {
        pub label: &'static str,
        pub checked: bool,
        pub href: String,
    }

    /// Everything the notes page template needs.
    #[derive(Debug, Serialize)]
    pub struct NotesPage {
        pub filters: FilterState,
        pub toggles: Vec<ToggleLink>,
        pub cards: Vec<Card>,
        pub empty_message: Option<&'static str>,
        pub error: Option<String>,
        pub retry_href: String,
    }

    pub fn href(filters: &FilterState) -> String {
        let params = [
            ("search", filters.search.clone()),
            ("public", filters.public.to_string()),
            ("private", filters.private.to_string()),
            ("articles", filters.articles.to_string()),
        ];

        reqwest::Url::parse_with_params("http://localhost/emp/notes", &params)
            .ok()
            .and_then(|url| url.query().map(|query| format!("{NOTES_PATH}?{query}")))
            .unwrap_or_else(|| NOTES_PATH.to_string())
    }

    fn toggles(filters: &FilterState) -> Vec<ToggleLink> {
        [
            (Toggle::Public, "Public"),
            (Toggle::Private, "Private Note"),
            (Toggle::Articles, "Articles"),
        ]
        .into_iter()
        .map(|(toggle, label)| ToggleLink {
            label,
            checked: filters.is_on(toggle),
            href: href(&filters.toggled(toggle)),
        })
        .collect()
    }

    pub async fn notes_page(filters: FilterState, base: BaseParams) -> NotesPage {
        let feed = load_feed(filters, base).await;
        let filters = feed.filters().clone();
        let retry_href = href(&filters);

        match feed.visible() {
            Some(filtered) => NotesPage {
                toggles: toggles(&filters),
                cards: filtered.notes.iter().map(|note| render(note)).collect(),
                empty_message: filtered.empty_state().map(EmptyState::message),
                error: None,
                retry_href,
                filters,
            },
            None => NotesPage {
                toggles: toggles(&filters),
                cards: Vec::new(),
                empty_message: None,
                error: Some(feed.error().unwrap_or("Failed to fetch notes").to_string()),
                retry_href,
                filters,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::{views::href, *};
    use crate::{
        backend::MemoryBackend,
        notes::{feed::NOTES_TABLE, FeedOptions},
    };

    fn base(backend: MemoryBackend) -> BaseParams {
        BaseParams::new(Arc::new(backend), FeedOptions::default())
    }

    #[tokio::test]
    async fn find_notes_reports_counts() {
        let backend = MemoryBackend::new().with_table(
            NOTES_TABLE,
            vec![json!({
                "id": 1,
                "note_content": "Only for me",
                "employee_id": "018f6146-32f4-7948-8289-cfb5cdb2b2af",
                "is_public": false,
                "is_approved_cbh": false,
                "is_approved_emp": false
            })],
        );

        let response = find_notes(
            FilterState {
                public: false,
                articles: false,
                ..FilterState::default()
            },
            base(backend),
        )
        .await
        .unwrap();

        assert_eq!(response.total, 5);
        assert_eq!(response.filtered, 1);
        assert_eq!(response.results[0].category, NoteType::Private);
        assert_eq!(response.results[0].card.address.as_deref(), Some("Topic Unknown, Item 1"));
    }

    #[tokio::test]
    async fn find_notes_surfaces_fetch_failures() {
        let backend = MemoryBackend::new().with_table(NOTES_TABLE, vec![]);
        backend.fail_next("Database connection failed");

        let err = find_notes(FilterState::default(), base(backend)).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(ref m) if m == "Database connection failed"));
    }

    #[tokio::test]
    async fn notes_page_shows_the_error_with_a_retry_link() {
        let backend = MemoryBackend::new().with_table(NOTES_TABLE, vec![]);
        backend.fail_next("Database connection failed");

        let page = views::notes_page(FilterState::default(), base(backend)).await;
        assert_eq!(page.error.as_deref(), Some("Database connection failed"));
        assert!(page.cards.is_empty());
        assert_eq!(page.retry_href, href(&FilterState::default()));
    }

    #[test]
    fn hrefs_encode_the_filter_state() {
        let filters = FilterState {
            search: "a & b".into(),
            private: false,
            ..FilterState::default()
        };
        assert_eq!(
            href(&filters),
            "/emp/notes?search=a+%26+b&public=true&private=false&articles=true"
        );
    }
}
