//! User registry: create-or-fetch by Telegram id

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};
use tracing::info;

use super::{Database, format_timestamp, timestamp_column};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, telegram_id, username, first_name, created_at";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        telegram_id: row.get(1)?,
        username: row.get(2)?,
        first_name: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
    })
}

impl Database {
    /// Register a user on first contact; later calls return the stored record
    /// untouched, even if the name or handle changed since.
    pub fn get_or_create_user(&self, new: &NewUser) -> TrackerResult<User> {
        new.validate()?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO users (telegram_id, username, first_name, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                new.telegram_id,
                new.username,
                new.first_name,
                format_timestamp(&Utc::now()),
            ],
        )?;
        if inserted > 0 {
            info!("Registered user with telegram id {}", new.telegram_id);
        }
        self.get_user_by_telegram_id(new.telegram_id)
    }

    pub fn get_user_by_telegram_id(&self, telegram_id: i64) -> TrackerResult<User> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?1"),
                params![telegram_id],
                row_to_user,
            )
            .optional()?
            .ok_or_else(|| TrackerError::NotFound(format!("user with telegram id {}", telegram_id)))
    }

    pub fn get_user(&self, id: i64) -> TrackerResult<User> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                row_to_user,
            )
            .optional()?
            .ok_or_else(|| TrackerError::NotFound(format!("user {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(telegram_id: i64, first_name: &str) -> NewUser {
        NewUser {
            telegram_id,
            username: Some(format!("user{}", telegram_id)),
            first_name: Some(first_name.to_string()),
        }
    }

    #[test]
    fn test_create_user() {
        let db = Database::open_in_memory().unwrap();
        let user = db.get_or_create_user(&new_user(42, "Иван")).unwrap();
        assert_eq!(user.telegram_id, 42);
        assert_eq!(user.first_name.as_deref(), Some("Иван"));
        assert_eq!(user.username.as_deref(), Some("user42"));
    }

    #[test]
    fn test_second_contact_returns_same_record() {
        let db = Database::open_in_memory().unwrap();
        let first = db.get_or_create_user(&new_user(42, "Иван")).unwrap();
        let second = db.get_or_create_user(&new_user(42, "Renamed")).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.first_name.as_deref(), Some("Иван"));
    }

    #[test]
    fn test_lookup_unknown_user() {
        let db = Database::open_in_memory().unwrap();
        let err = db.get_user_by_telegram_id(7).unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
        assert!(matches!(db.get_user(7).unwrap_err(), TrackerError::NotFound(_)));
    }

    #[test]
    fn test_lookup_by_internal_id() {
        let db = Database::open_in_memory().unwrap();
        let user = db.get_or_create_user(&new_user(5, "Оля")).unwrap();
        assert_eq!(db.get_user(user.id).unwrap(), user);
    }

    #[test]
    fn test_invalid_telegram_id() {
        let db = Database::open_in_memory().unwrap();
        let err = db.get_or_create_user(&new_user(-1, "x")).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }
}
