//! Read access to the managed backend that owns notes, profiles and schedules.
//!
//! The service never writes. Every consumer goes through [`Backend::select`],
//! which mirrors the query surface of a PostgREST-style API: one table, equality
//! and membership filters, a single ordering column and an optional limit.

mod memory;
mod rest;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use memory::MemoryBackend;
pub use rest::RestBackend;
pub use sqlite::SqliteBackend;

use crate::{
    config::{BackendKind, Config},
    db,
    notes::NOTES_TABLE,
    topics::{SCHEDULES_TABLE, SCHEDULE_ORGANIZATIONS_TABLE},
};

/// One raw row, keyed by column name.
pub type Row = Map<String, Value>;

pub type SharedBackend = Arc<dyn Backend>;

#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Database(#[from] db::Error),
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, BackendError>;

    /// Where the backend lives, reported by the diagnostic endpoints.
    fn location(&self) -> String;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    In(String, Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.into(), value.into()));
        self
    }

    pub fn is_in(mut self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.filters.push(Filter::In(column.into(), values));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            descending: true,
        });
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            descending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Builds the backend selected by the configuration.
pub async fn from_config(config: &Config) -> crate::Result<SharedBackend> {
    let backend: SharedBackend = match config.backend {
        BackendKind::Sqlite => {
            let db = db::init_db(&config.database_url, config.seed_fixtures).await?;
            Arc::new(SqliteBackend::new(db, config.database_url.clone()))
        }
        BackendKind::Rest => {
            let url = config
                .backend_url
                .clone()
                .ok_or_else(|| crate::Error::Unexpected("BACKEND_URL is required for the rest backend".into()))?;
            Arc::new(RestBackend::new(url, config.backend_key.clone().unwrap_or_default()))
        }
        BackendKind::Memory => Arc::new(
            MemoryBackend::new()
                .with_table(NOTES_TABLE, vec![])
                .with_table("profiles", vec![])
                .with_table(SCHEDULES_TABLE, vec![])
                .with_table(SCHEDULE_ORGANIZATIONS_TABLE, vec![]),
        ),
    };

    tracing::info!(backend = ?config.backend, location = %backend.location(), "backend ready");
    Ok(backend)
}
