//! Coercion of raw backend rows into canonical [`Note`]s.
//!
//! Older rows predate most display columns, so missing values are filled in
//! before the structural checks run. A row that still fails is dropped on its
//! own; the rest of the batch is unaffected.

use rand::Rng;
use serde_json::{Map, Value};
use validator::Validate;

use super::model::{Note, NoteType};
use crate::backend::Row;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("record is not an object")]
    NotAnObject,
    #[error("invalid record shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("invalid record: {0}")]
    Rules(#[from] validator::ValidationErrors),
}

/// What to put in `view_count` / `like_count` when a row has none.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum StatsDefault {
    #[default]
    Zero,
    /// Placeholder numbers in `[0, 50)` views and `[0, 10)` likes.
    Random,
}

impl StatsDefault {
    fn views(self) -> u32 {
        match self {
            StatsDefault::Zero => 0,
            StatsDefault::Random => rand::thread_rng().gen_range(0..50),
        }
    }

    fn likes(self) -> u32 {
        match self {
            StatsDefault::Zero => 0,
            StatsDefault::Random => rand::thread_rng().gen_range(0..10),
        }
    }
}

const FLAGS: [&str; 3] = ["is_public", "is_approved_cbh", "is_approved_emp"];

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
        None | Some(Value::Null) => false,
    }
}

/// Fills defaults and coerces loosely typed columns. `index` is the row's
/// zero-based position in the fetched batch.
pub fn normalize(row: &Row, index: usize, stats: StatsDefault) -> Row {
    let mut row: Map<String, Value> = row.clone();

    // SQL backends hand booleans back as 0 / 1
    for flag in FLAGS {
        if let Some(Value::Number(n)) = row.get(flag) {
            if let Some(n) = n.as_i64().filter(|n| *n == 0 || *n == 1) {
                row.insert(flag.into(), Value::Bool(n == 1));
            }
        }
    }

    if let Some(Value::String(text)) = row.get("textrange") {
        let parsed = serde_json::from_str::<Value>(text).unwrap_or(Value::Null);
        row.insert("textrange".into(), parsed);
    }

    if is_blank(row.get("address")) {
        let topic = match row.get("topic_id") {
            Some(topic) if truthy(Some(topic)) => literal(topic),
            _ => "Unknown".to_string(),
        };
        row.insert("address".into(), Value::String(format!("Topic {topic}, Item {}", index + 1)));
    }

    for optional in ["quote", "article_link"] {
        if is_blank(row.get(optional)) {
            row.insert(optional.into(), Value::Null);
        }
    }

    if is_blank(row.get("note_type")) {
        let fallback = NoteType::from_visibility(truthy(row.get("is_public")));
        row.insert("note_type".into(), Value::String(fallback.as_str().into()));
    }

    if matches!(row.get("view_count"), None | Some(Value::Null)) {
        row.insert("view_count".into(), Value::from(stats.views()));
    }
    if matches!(row.get("like_count"), None | Some(Value::Null)) {
        row.insert("like_count".into(), Value::from(stats.likes()));
    }

    row
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalizes and validates a single row.
pub fn validate_record(value: &Value, index: usize, stats: StatsDefault) -> Result<Note, ValidationError> {
    let row = value.as_object().ok_or(ValidationError::NotAnObject)?;
    let note: Note = serde_json::from_value(Value::Object(normalize(row, index, stats)))?;
    note.validate()?;
    Ok(note)
}

/// Validates every row independently, keeping input order. Rejected rows
/// are logged and skipped.
pub fn validate_batch(rows: Vec<Row>, stats: StatsDefault) -> Vec<Note> {
    let total = rows.len();

    let notes = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let row = Value::Object(row);
            match validate_record(&row, index, stats) {
                Ok(note) => Some(note),
                Err(error) => {
                    tracing::warn!(index, %error, record = %row, "dropping invalid note record");
                    None
                }
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(total, valid = notes.len(), "validated note records");
    notes
}
