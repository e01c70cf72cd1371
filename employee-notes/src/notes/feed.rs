//! The notes list session: fetch, validate, merge demo notes, filter.
//!
//! ```text
//! idle ──load──▶ loading ──ok──▶ ready ◀─┐ filter changes (no fetch)
//!                   │                    └─┘
//!                   └──err──▶ failed ──retry──▶ loading
//! ```
//!
//! Every fetch takes a [`FetchTicket`]. Only the completion carrying the most
//! recent ticket is applied, so a superseded fetch that lands late is ignored.

use schemars::JsonSchema;
use serde::Serialize;

use super::{
    demo::demo_notes,
    filter::{FilterState, FilteredNotes},
    model::Note,
    validate::{validate_batch, StatsDefault},
};
use crate::backend::{Backend, BackendError, Row, SelectQuery};

pub const NOTES_TABLE: &str = "notes";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedOptions {
    pub demo_notes: bool,
    pub missing_stats: StatsDefault,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            demo_notes: true,
            missing_stats: StatsDefault::Zero,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Idle,
    Loading,
    Ready(Vec<Note>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

impl FeedState {
    pub fn status(&self) -> FeedStatus {
        match self {
            FeedState::Idle => FeedStatus::Idle,
            FeedState::Loading => FeedStatus::Loading,
            FeedState::Ready(_) => FeedStatus::Ready,
            FeedState::Failed(_) => FeedStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

pub fn notes_query() -> SelectQuery {
    SelectQuery::table(NOTES_TABLE).order_desc("created_at")
}

#[derive(Debug)]
pub struct NotesFeed {
    state: FeedState,
    filters: FilterState,
    options: FeedOptions,
    latest: u64,
}

impl NotesFeed {
    pub fn new(options: FeedOptions) -> Self {
        Self {
            state: FeedState::Idle,
            filters: FilterState::default(),
            options,
            latest: 0,
        }
    }

    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Replacing the filters only recomputes the visible list.
    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FeedState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn notes(&self) -> &[Note] {
        match &self.state {
            FeedState::Ready(notes) => notes,
            _ => &[],
        }
    }

    /// Notes passing the current filters; `None` unless the feed is ready.
    pub fn visible(&self) -> Option<FilteredNotes<'_>> {
        match &self.state {
            FeedState::Ready(notes) => Some(self.filters.apply(notes)),
            _ => None,
        }
    }

    /// Enters `loading` and hands out the ticket the completion must carry.
    pub fn begin(&mut self) -> FetchTicket {
        self.latest += 1;
        self.state = FeedState::Loading;
        FetchTicket(self.latest)
    }

    /// Applies a fetch result. Returns `false` when the ticket was superseded
    /// and the result was discarded.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Vec<Row>, BackendError>) -> bool {
        if ticket.0 != self.latest {
            tracing::debug!(ticket = ticket.0, latest = self.latest, "discarding superseded notes fetch");
            return false;
        }

        self.state = match result {
            Ok(rows) => {
                let mut notes = validate_batch(rows, self.options.missing_stats);
                if self.options.demo_notes {
                    notes.extend(demo_notes());
                }
                tracing::debug!(notes = notes.len(), "notes ready");
                FeedState::Ready(notes)
            }
            Err(error) => {
                tracing::error!(%error, "failed to fetch notes");
                FeedState::Failed(error.to_string())
            }
        };
        true
    }

    /// Fetches all notes, newest first, and settles in `ready` or `failed`.
    pub async fn load(&mut self, backend: &dyn Backend) -> &FeedState {
        let ticket = self.begin();
        let result = backend.select(&notes_query()).await;
        self.complete(ticket, result);
        &self.state
    }

    /// Re-fetches from scratch after a failure. Other states are left alone.
    pub async fn retry(&mut self, backend: &dyn Backend) -> &FeedState {
        if matches!(self.state, FeedState::Failed(_)) {
            tracing::info!("retrying notes fetch");
            return self.load(backend).await;
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        backend::MemoryBackend,
        notes::{demo::DEMO_IDS, filter::EmptyState, model::NoteType},
    };

    fn row(id: i64, content: &str, note_type: &str, created_at: &str) -> Value {
        json!({
            "id": id,
            "note_content": content,
            "employee_id": "018f6146-32f4-7948-8289-cfb5cdb2b2af",
            "is_public": true,
            "is_approved_cbh": true,
            "is_approved_emp": true,
            "note_type": note_type,
            "created_at": created_at
        })
    }

    fn ids(notes: &[Note]) -> Vec<i64> {
        notes.iter().map(|n| n.id).collect()
    }

    #[tokio::test]
    async fn empty_backend_yields_the_demo_notes() {
        let backend = MemoryBackend::new().with_table(NOTES_TABLE, vec![]);
        let mut feed = NotesFeed::new(FeedOptions::default());

        assert_eq!(feed.state(), &FeedState::Idle);
        feed.load(&backend).await;

        assert_eq!(feed.state().status(), FeedStatus::Ready);
        assert_eq!(ids(feed.notes()), DEMO_IDS);
    }

    #[tokio::test]
    async fn rows_come_first_newest_first() {
        let backend = MemoryBackend::new().with_table(
            NOTES_TABLE,
            vec![
                row(1, "older", "public", "2024-01-01T00:00:00Z"),
                row(2, "newer", "private", "2024-02-01T00:00:00Z"),
                json!({ "id": 3, "note_content": "" }),
            ],
        );
        let mut feed = NotesFeed::new(FeedOptions::default());
        feed.load(&backend).await;

        assert_eq!(ids(feed.notes()), vec![2, 1, 1001, 1002, 1003, 1004]);
    }

    #[tokio::test]
    async fn demo_notes_can_be_turned_off() {
        let backend = MemoryBackend::new().with_table(NOTES_TABLE, vec![row(1, "only", "public", "2024-01-01T00:00:00Z")]);
        let mut feed = NotesFeed::new(FeedOptions {
            demo_notes: false,
            ..FeedOptions::default()
        });
        feed.load(&backend).await;

        assert_eq!(ids(feed.notes()), vec![1]);
    }

    #[tokio::test]
    async fn failures_keep_the_message_and_retry_recovers() {
        let backend = MemoryBackend::new().with_table(NOTES_TABLE, vec![row(1, "hello", "public", "2024-01-01T00:00:00Z")]);
        backend.fail_next("Database connection failed");

        let mut feed = NotesFeed::new(FeedOptions::default());
        feed.load(&backend).await;

        assert_eq!(feed.state(), &FeedState::Failed("Database connection failed".into()));
        assert_eq!(feed.error(), Some("Database connection failed"));
        assert!(feed.notes().is_empty());
        assert!(feed.visible().is_none());

        feed.retry(&backend).await;
        assert_eq!(feed.state().status(), FeedStatus::Ready);
        assert_eq!(ids(feed.notes()), vec![1, 1001, 1002, 1003, 1004]);
        assert_eq!(backend.select_count(), 2);
    }

    #[tokio::test]
    async fn retry_only_refetches_after_failure() {
        let backend = MemoryBackend::new().with_table(NOTES_TABLE, vec![]);
        let mut feed = NotesFeed::new(FeedOptions::default());
        feed.load(&backend).await;
        feed.retry(&backend).await;

        assert_eq!(backend.select_count(), 1);
    }

    #[tokio::test]
    async fn filter_changes_do_not_refetch() {
        let backend = MemoryBackend::new().with_table(
            NOTES_TABLE,
            vec![row(1, "private thoughts", "private", "2024-01-01T00:00:00Z")],
        );
        let mut feed = NotesFeed::new(FeedOptions::default());
        feed.load(&backend).await;

        assert_eq!(feed.visible().unwrap().len(), 5);

        feed.set_filters(FilterState {
            public: false,
            private: false,
            articles: false,
            ..FilterState::default()
        });
        let visible = feed.visible().unwrap();
        assert!(visible.is_empty());
        assert_eq!(visible.empty_state(), Some(EmptyState::NoMatches));

        feed.set_filters(FilterState {
            search: "PRIVATE".into(),
            ..FilterState::default()
        });
        let visible = feed.visible().unwrap();
        assert_eq!(visible.notes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(visible.notes[0].category(), NoteType::Private);

        assert_eq!(backend.select_count(), 1);
    }

    #[test]
    fn superseded_fetches_are_discarded() {
        let mut feed = NotesFeed::new(FeedOptions::default());

        let first = feed.begin();
        let second = feed.begin();

        assert!(feed.complete(second, Ok(vec![])));
        assert!(!feed.complete(first, Err(BackendError::message("timed out"))));
        assert_eq!(feed.state().status(), FeedStatus::Ready);
        assert_eq!(ids(feed.notes()), DEMO_IDS);
    }
}
