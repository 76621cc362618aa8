//! Database module - SQLite storage for users, the exercise catalog and set logs

mod exercises;
mod logs;
mod users;

pub use logs::LogStore;

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row, ffi, types::Type};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::TrackerResult;

/// Handle shared between API handlers and bot endpoints
pub type SharedDb = Arc<Mutex<Database>>;

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database, then seed the catalog if it is empty
    pub fn open(path: &str) -> TrackerResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self::from_connection(conn)?;
        info!("Database opened: {}", path);
        Ok(db)
    }

    /// Fresh private database, used by tests and dry runs
    pub fn open_in_memory() -> TrackerResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> TrackerResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self { conn };
        db.init_schema()?;
        let seeded = db.seed_exercises()?;
        if seeded > 0 {
            info!("Seeded {} built-in exercises", seeded);
        }
        Ok(db)
    }

    pub fn into_shared(self) -> SharedDb {
        Arc::new(Mutex::new(self))
    }

    /// Initialize database schema
    fn init_schema(&self) -> TrackerResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                telegram_id INTEGER UNIQUE NOT NULL,
                username TEXT,
                first_name TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                photo_path TEXT,
                is_custom INTEGER NOT NULL DEFAULT 0,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS workout_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                exercise_id INTEGER NOT NULL,
                set_number INTEGER NOT NULL,
                weight REAL NOT NULL,
                reps INTEGER NOT NULL,
                date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users (id),
                FOREIGN KEY (exercise_id) REFERENCES exercises (id)
            );

            CREATE INDEX IF NOT EXISTS idx_workout_logs_user_date
                ON workout_logs (user_id, date);",
        )?;

        // Migration: databases created by the first server version had no
        // unique name constraint. Duplicates there keep the index from being
        // built; the catalog still works, only conflict detection is lost.
        if let Err(e) = self.conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_exercises_name ON exercises (name)",
            [],
        ) {
            warn!("Could not enforce unique exercise names: {}", e);
        }

        Ok(())
    }
}

/// Fixed-width UTC text so that lexical order is chronological order
pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Reads RFC 3339 as well as SQLite's `CURRENT_TIMESTAMP` layout
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(d) => Ok(d.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|d| d.and_utc()),
    }
}

pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Extended result code of a constraint failure, if that is what `err` is
pub(crate) fn constraint_violation(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            Some(e.extended_code)
        }
        _ => None,
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    constraint_violation(err) == Some(ffi::SQLITE_CONSTRAINT_UNIQUE)
}

pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    constraint_violation(err) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}
