//! Illustrative notes appended to every fetch, one per distinctive layout.
//! They are never persisted and use ids above the range real rows reach.

use chrono::Utc;
use uuid::{uuid, Uuid};

use super::model::{Note, NoteType};

pub const DEMO_IDS: [i64; 4] = [1001, 1002, 1003, 1004];

const DEMO_EMPLOYEES: [Uuid; 4] = [
    uuid!("00000000-0000-4000-8000-000000000001"),
    uuid!("00000000-0000-4000-8000-000000000002"),
    uuid!("00000000-0000-4000-8000-000000000003"),
    uuid!("00000000-0000-4000-8000-000000000004"),
];

pub fn demo_notes() -> Vec<Note> {
    let now = Utc::now().to_rfc3339();
    let base = |index: usize, content: &str, note_type: NoteType| Note {
        id: DEMO_IDS[index],
        textrange: None,
        note_content: content.into(),
        topic_id: None,
        employee_id: DEMO_EMPLOYEES[index],
        is_public: true,
        is_approved_cbh: true,
        is_approved_emp: true,
        address: None,
        quote: None,
        note_type: Some(note_type),
        view_count: Some(0),
        like_count: Some(0),
        article_link: None,
        created_at: Some(now.clone()),
        updated_at: Some(now.clone()),
    };

    vec![
        Note {
            is_approved_cbh: false,
            address: Some("Truth and Reconciliation Guide, Page 15".into()),
            quote: Some("Reconciliation is not an Aboriginal problem; it is a Canadian opportunity.".into()),
            view_count: Some(5),
            like_count: Some(2),
            ..base(0, "This quote really resonates with my daily work experience.", NoteType::UnderReview)
        },
        Note {
            is_public: false,
            is_approved_cbh: false,
            is_approved_emp: false,
            address: Some("Team Meeting Discussion Thread #45".into()),
            ..base(1, "Great insights shared in our team discussion today.", NoteType::Comment)
        },
        Note {
            address: Some("Workplace Reconciliation Resources".into()),
            view_count: Some(28),
            like_count: Some(6),
            article_link: Some("https://www.rcaanc-cirnac.gc.ca/eng/1100100014597/1572547985018".into()),
            ..base(
                2,
                "This article provides excellent practical guidance for workplace implementation.",
                NoteType::Article,
            )
        },
        Note {
            address: Some("Learning Module 3: Understanding History".into()),
            view_count: Some(42),
            like_count: Some(8),
            ..base(
                3,
                "I found this topic very enlightening and it changed my perspective.",
                NoteType::Public,
            )
        },
    ]
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[test]
    fn demo_set_is_fixed() {
        let notes = demo_notes();

        assert_eq!(notes.iter().map(|n| n.id).collect::<Vec<_>>(), DEMO_IDS);
        assert_eq!(
            notes.iter().map(|n| n.category()).collect::<Vec<_>>(),
            vec![
                NoteType::UnderReview,
                NoteType::Comment,
                NoteType::Article,
                NoteType::Public
            ]
        );
    }

    #[test]
    fn demo_notes_satisfy_the_note_rules() {
        for note in demo_notes() {
            assert!(note.validate().is_ok(), "{note:?}");
        }
    }
}
