//src/db.rs
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{named_params, params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::APP_DIR;

const DB_FILE_NAME: &str = "history.sqlite";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database insert failed: {0}")]
    InsertFailed(rusqlite::Error),
    #[error("Database delete failed: {0}")]
    DeleteFailed(rusqlite::Error),
    #[error("No completion recorded for {0}")]
    CompletionNotFound(NaiveDate),
}

/// One finished session, keyed by calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub date: NaiveDate,
    pub day_name: String,
    pub variant: Option<String>,
    pub elapsed_sec: u64,
    pub completed: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Gets the path to the SQLite database file within the app's data directory.
/// # Errors
/// Returns `DbError` if the data dir cannot be found or created.
pub fn get_db_path() -> Result<PathBuf, DbError> {
    let data_dir = dirs::data_dir().ok_or(DbError::DataDir)?;
    let app_dir = data_dir.join(APP_DIR); // Same dir name as config
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database.
/// # Errors
/// Returns `DbError::Connection` if SQLite cannot open the file.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, DbError> {
    let conn = Connection::open(path).map_err(DbError::Connection)?;
    Ok(conn)
}

/// Initializes the database tables if they don't exist.
/// # Errors
/// Returns `DbError::Connection` if the schema cannot be created.
pub fn init_db(conn: &Connection) -> Result<(), DbError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS completions (
            date TEXT PRIMARY KEY NOT NULL, -- YYYY-MM-DD, one record per calendar day
            day_name TEXT NOT NULL,
            variant TEXT,
            elapsed_sec INTEGER NOT NULL,
            completed INTEGER NOT NULL DEFAULT 1,
            recorded_at TEXT NOT NULL -- RFC3339
        )",
        [],
    )
    .map_err(DbError::Connection)?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_completions_recorded_at ON completions(recorded_at)",
        [],
    )
    .map_err(DbError::Connection)?;

    Ok(())
}

/// Writes a record for `record.date`, replacing any earlier one (last write wins).
/// # Errors
/// Returns `DbError::InsertFailed` on SQLite failure.
pub fn record_completion(conn: &Connection, record: &CompletionRecord) -> Result<(), DbError> {
    let elapsed = i64::try_from(record.elapsed_sec).unwrap_or(i64::MAX);
    conn.execute(
        "INSERT INTO completions (date, day_name, variant, elapsed_sec, completed, recorded_at)
         VALUES (:date, :day_name, :variant, :elapsed_sec, :completed, :recorded_at)
         ON CONFLICT(date) DO UPDATE SET
            day_name = excluded.day_name,
            variant = excluded.variant,
            elapsed_sec = excluded.elapsed_sec,
            completed = excluded.completed,
            recorded_at = excluded.recorded_at",
        named_params! {
            ":date": record.date.format("%Y-%m-%d").to_string(),
            ":day_name": record.day_name,
            ":variant": record.variant,
            ":elapsed_sec": elapsed,
            ":completed": record.completed,
            ":recorded_at": record.recorded_at.to_rfc3339(),
        },
    )
    .map_err(DbError::InsertFailed)?;
    Ok(())
}

fn map_row_to_completion(row: &Row) -> Result<CompletionRecord, rusqlite::Error> {
    let date_str: String = row.get(0)?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let recorded_str: String = row.get(5)?;
    let recorded_at = DateTime::parse_from_rfc3339(&recorded_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
    let elapsed: i64 = row.get(3)?;

    Ok(CompletionRecord {
        date,
        day_name: row.get(1)?,
        variant: row.get(2)?,
        elapsed_sec: u64::try_from(elapsed).unwrap_or(0),
        completed: row.get(4)?,
        recorded_at,
    })
}

/// # Errors
/// Returns `DbError::QueryFailed` on SQLite failure.
pub fn get_completion(conn: &Connection, date: NaiveDate) -> Result<Option<CompletionRecord>, DbError> {
    conn.query_row(
        "SELECT date, day_name, variant, elapsed_sec, completed, recorded_at
         FROM completions WHERE date = ?1",
        params![date.format("%Y-%m-%d").to_string()],
        map_row_to_completion,
    )
    .optional()
    .map_err(DbError::QueryFailed)
}

/// Records with `start <= date <= end`, oldest first.
/// # Errors
/// Returns `DbError::QueryFailed` on SQLite failure.
pub fn list_completions_between(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CompletionRecord>, DbError> {
    let mut stmt = conn
        .prepare(
            "SELECT date, day_name, variant, elapsed_sec, completed, recorded_at
             FROM completions
             WHERE date >= :start AND date <= :end
             ORDER BY date ASC",
        )
        .map_err(DbError::QueryFailed)?;
    let rows = stmt
        .query_map(
            named_params! {
                ":start": start.format("%Y-%m-%d").to_string(),
                ":end": end.format("%Y-%m-%d").to_string(),
            },
            map_row_to_completion,
        )
        .map_err(DbError::QueryFailed)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DbError::QueryFailed)
}

/// Most recent records first.
/// # Errors
/// Returns `DbError::QueryFailed` on SQLite failure.
pub fn list_recent_completions(conn: &Connection, limit: u32) -> Result<Vec<CompletionRecord>, DbError> {
    let mut stmt = conn
        .prepare(
            "SELECT date, day_name, variant, elapsed_sec, completed, recorded_at
             FROM completions ORDER BY date DESC LIMIT ?1",
        )
        .map_err(DbError::QueryFailed)?;
    let rows = stmt
        .query_map(params![limit], map_row_to_completion)
        .map_err(DbError::QueryFailed)?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DbError::QueryFailed)
}

/// # Errors
/// Returns `DbError::CompletionNotFound` if nothing was stored for `date`.
pub fn delete_completion(conn: &Connection, date: NaiveDate) -> Result<usize, DbError> {
    let rows_affected = conn
        .execute(
            "DELETE FROM completions WHERE date = ?1",
            params![date.format("%Y-%m-%d").to_string()],
        )
        .map_err(DbError::DeleteFailed)?;
    if rows_affected == 0 {
        return Err(DbError::CompletionNotFound(date));
    }
    Ok(rows_affected)
}
