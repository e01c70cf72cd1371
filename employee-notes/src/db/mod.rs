mod migrations;

pub use rusqlite;
pub use tokio_rusqlite;

use migrations::{DEV_FIXTURES, MIGRATIONS};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_found")]
    NotFound(String),
    #[error(transparent)]
    TokioRusqlite(tokio_rusqlite::Error),
    #[error(transparent)]
    Rusqlite(rusqlite::Error),
}

impl From<tokio_rusqlite::Error> for Error {
    fn from(error: tokio_rusqlite::Error) -> Self {
        match error {
            tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows) => Self::NotFound("Not found".into()),
            tokio_rusqlite::Error::Rusqlite(error) => Self::Rusqlite(error),
            error => Self::TokioRusqlite(error),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::Rusqlite(error)
    }
}

pub type DB = tokio_rusqlite::Connection;

pub async fn init_db(path: &str, seed_fixtures: bool) -> Result<DB> {
    let conn = tokio_rusqlite::Connection::open(path).await?;

    conn.call(|conn| {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    })
    .await?;

    migrate(&conn).await?;

    if seed_fixtures {
        seed(&conn).await?;
    }

    Ok(conn)
}

async fn migrate(conn: &DB) -> Result<()> {
    conn.call(|conn| {
        MIGRATIONS
            .to_latest(conn)
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
    })
    .await?;
    Ok(())
}

/// Inserts the development fixtures once, when the notes table is still empty.
async fn seed(conn: &DB) -> Result<()> {
    let inserted = conn
        .call(|conn| {
            let count: i64 = conn.query_row("SELECT count(*) FROM notes", [], |r| r.get(0))?;
            if count > 0 {
                return Ok(false);
            }
            conn.execute_batch(DEV_FIXTURES)?;
            Ok(true)
        })
        .await?;

    if inserted {
        tracing::info!("seeded development fixtures");
    }
    Ok(())
}

#[cfg(test)]
pub async fn init_test_db() -> Result<DB> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    migrate(&conn).await?;
    Ok(conn)
}
