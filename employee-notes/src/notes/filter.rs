use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::model::{effective_category, Note, NoteType};

fn default_true() -> bool {
    true
}

/// Search text plus the three category toggles of the notes list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FilterState {
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default = "default_true")]
    pub private: bool,
    #[serde(default = "default_true")]
    pub articles: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            public: true,
            private: true,
            articles: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    Public,
    Private,
    Articles,
}

impl FilterState {
    pub fn toggled(&self, toggle: Toggle) -> Self {
        let mut next = self.clone();
        match toggle {
            Toggle::Public => next.public = !next.public,
            Toggle::Private => next.private = !next.private,
            Toggle::Articles => next.articles = !next.articles,
        }
        next
    }

    pub fn is_on(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Public => self.public,
            Toggle::Private => self.private,
            Toggle::Articles => self.articles,
        }
    }

    /// Case-insensitive substring match on the note body. An empty search
    /// matches everything.
    pub fn search_matches(&self, note: &Note) -> bool {
        self.search.is_empty() || note.note_content.to_lowercase().contains(&self.search.to_lowercase())
    }

    pub fn category_matches(&self, category: NoteType) -> bool {
        use NoteType::*;

        // shared articles answer to both the public and the articles toggle
        (self.public && matches!(category, Public | SharedArticle | UnderReview | Comment))
            || (self.private && category == Private)
            || (self.articles && matches!(category, Article | SharedArticle))
    }

    pub fn includes(&self, note: &Note) -> bool {
        self.search_matches(note) && self.category_matches(effective_category(note))
    }

    pub fn apply<'a>(&self, notes: &'a [Note]) -> FilteredNotes<'a> {
        FilteredNotes {
            total: notes.len(),
            notes: notes.iter().filter(|note| self.includes(note)).collect(),
        }
    }
}

/// Why a filtered list came out empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    NoNotes,
    NoMatches,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NoNotes => "No notes found.",
            EmptyState::NoMatches => "No notes match your current filters.",
        }
    }
}

#[derive(Debug)]
pub struct FilteredNotes<'a> {
    pub total: usize,
    pub notes: Vec<&'a Note>,
}

impl FilteredNotes<'_> {
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        match (self.total, self.notes.len()) {
            (0, _) => Some(EmptyState::NoNotes),
            (_, 0) => Some(EmptyState::NoMatches),
            _ => None,
        }
    }
}
