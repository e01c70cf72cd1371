use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub type EmployeeId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum NoteType {
    Public,
    Private,
    SharedArticle,
    UnderReview,
    Comment,
    Article,
}

impl NoteType {
    pub const ALL: [NoteType; 6] = [
        NoteType::Public,
        NoteType::Private,
        NoteType::SharedArticle,
        NoteType::UnderReview,
        NoteType::Comment,
        NoteType::Article,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NoteType::Public => "public",
            NoteType::Private => "private",
            NoteType::SharedArticle => "shared-article",
            NoteType::UnderReview => "under-review",
            NoteType::Comment => "comment",
            NoteType::Article => "article",
        }
    }

    /// Category of rows written before `note_type` existed.
    pub fn from_visibility(is_public: bool) -> Self {
        if is_public {
            NoteType::Public
        } else {
            NoteType::Private
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct Note {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textrange: Option<Vec<i64>>,
    #[validate(length(min = 1, message = "note_content must not be empty"))]
    pub note_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<i64>,
    pub employee_id: EmployeeId,
    pub is_public: bool,
    pub is_approved_cbh: bool,
    pub is_approved_emp: bool,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub note_type: Option<NoteType>,
    #[serde(default)]
    pub view_count: Option<u32>,
    #[serde(default)]
    pub like_count: Option<u32>,
    #[serde(default)]
    #[validate(url(message = "article_link must be a valid URL"))]
    pub article_link: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Note {
    pub fn category(&self) -> NoteType {
        effective_category(self)
    }
}

/// The single display category of a note.
///
/// An explicit `note_type` always wins; older rows without one fall back to
/// the legacy `is_public` flag.
pub fn effective_category(note: &Note) -> NoteType {
    match note.note_type {
        Some(note_type) => note_type,
        None => NoteType::from_visibility(note.is_public),
    }
}


#[cfg(test)]
mod tests {
    use super::{fixtures::note, *};

    #[test]
    fn missing_note_type_follows_is_public() {
        let mut legacy = note(1, "legacy", None);

        legacy.is_public = true;
        assert_eq!(effective_category(&legacy), NoteType::Public);

        legacy.is_public = false;
        assert_eq!(effective_category(&legacy), NoteType::Private);
    }

    #[test]
    fn explicit_note_type_wins_over_is_public() {
        for note_type in NoteType::ALL {
            for is_public in [true, false] {
                let mut n = note(1, "typed", Some(note_type));
                n.is_public = is_public;
                assert_eq!(n.category(), note_type);
            }
        }
    }

    #[test]
    fn note_types_use_kebab_case_names() {
        for note_type in NoteType::ALL {
            let json = serde_json::to_value(note_type).unwrap();
            assert_eq!(json, note_type.as_str());
        }
        assert_eq!(
            serde_json::from_str::<NoteType>("\"shared-article\"").unwrap(),
            NoteType::SharedArticle
        );
    }
}
