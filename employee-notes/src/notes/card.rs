//! Card layouts for the notes list.

use schemars::JsonSchema;
use serde::Serialize;

use super::model::{effective_category, Note, NoteType};

pub const ARTICLE_FALLBACK_LABEL: &str = "View Article";
pub const UNDER_REVIEW_LABEL: &str = "Under review";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CardAction {
    Edit,
    EditAndSharing,
}

impl CardAction {
    pub fn label(self) -> &'static str {
        match self {
            CardAction::Edit => "Edit",
            CardAction::EditAndSharing => "Edit & Sharing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct QuoteBlock {
    pub quote: String,
    pub address: Option<String>,
}

/// Always opened in a new browsing context.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ArticleLink {
    pub href: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Stats {
    pub likes: u32,
    pub views: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Card {
    pub id: i64,
    pub content: String,
    pub category: NoteType,
    pub quote: Option<QuoteBlock>,
    pub address: Option<String>,
    pub link: Option<ArticleLink>,
    pub action: CardAction,
    pub action_label: &'static str,
    pub stats: Option<Stats>,
    pub label: Option<&'static str>,
}

pub fn render(note: &Note) -> Card {
    render_as(note, effective_category(note))
}

/// Lays out `note` as a card of the given category.
pub fn render_as(note: &Note, category: NoteType) -> Card {
    let quote = note.quote.as_ref().map(|quote| QuoteBlock {
        quote: quote.clone(),
        address: note.address.clone(),
    });

    // a quote block already carries the address
    let address = match category {
        _ if quote.is_some() => None,
        NoteType::Article => None,
        _ => note.address.clone(),
    };

    let link = match (category, &note.article_link) {
        (NoteType::Article, Some(href)) => Some(ArticleLink {
            href: href.clone(),
            label: note
                .address
                .clone()
                .unwrap_or_else(|| ARTICLE_FALLBACK_LABEL.to_string()),
        }),
        _ => None,
    };

    let action = match category {
        NoteType::UnderReview => CardAction::Edit,
        _ => CardAction::EditAndSharing,
    };

    let stats = match category {
        NoteType::Public | NoteType::SharedArticle => Some(Stats {
            likes: note.like_count.unwrap_or(0),
            views: note.view_count.unwrap_or(0),
        }),
        _ => None,
    };

    let label = (category == NoteType::UnderReview).then_some(UNDER_REVIEW_LABEL);

    Card {
        id: note.id,
        content: note.note_content.clone(),
        category,
        quote,
        address,
        link,
        action,
        action_label: action.label(),
        stats,
        label,
    }
}
