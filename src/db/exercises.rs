//! Exercise catalog storage

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params, types::Type};
use tracing::info;

use super::{Database, format_timestamp, is_unique_violation};
use crate::error::{TrackerError, TrackerResult};
use crate::exercises::{Category, get_seed_exercises};
use crate::models::{Exercise, NewExercise};

const EXERCISE_COLUMNS: &str = "id, name, category, photo_path, is_custom";

fn row_to_exercise(row: &Row<'_>) -> rusqlite::Result<Exercise> {
    let raw_category: String = row.get(2)?;
    let category = raw_category
        .parse::<Category>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(Exercise {
        id: row.get(0)?,
        name: row.get(1)?,
        category,
        photo_path: row.get(3)?,
        is_custom: row.get(4)?,
    })
}

impl Database {
    /// Insert the built-in catalog when no exercise exists yet.
    /// Returns how many rows were inserted (0 when skipped).
    pub fn seed_exercises(&self) -> TrackerResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO exercises (name, category, photo_path, is_custom, created_at)
                 VALUES (?1, ?2, NULL, 0, ?3)",
            )?;
            let now = format_timestamp(&Utc::now());
            for seed in get_seed_exercises() {
                stmt.execute(params![seed.name, seed.category.as_str(), now])?;
            }
        }
        tx.commit()?;
        Ok(get_seed_exercises().len())
    }

    /// Built-in exercises first, then custom ones, each alphabetical
    pub fn list_exercises(&self) -> TrackerResult<Vec<Exercise>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises ORDER BY is_custom, name"
        ))?;
        let exercises = stmt
            .query_map([], row_to_exercise)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    /// Add a user-submitted exercise
    pub fn create_exercise(&self, new: &NewExercise) -> TrackerResult<Exercise> {
        let (name, category) = new.validate()?;
        let photo_path = new.photo().map(str::to_string);

        self.conn
            .execute(
                "INSERT INTO exercises (name, category, photo_path, is_custom, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                params![name, category.as_str(), photo_path, format_timestamp(&Utc::now())],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    TrackerError::Conflict(format!("exercise '{}' already exists", name))
                } else {
                    TrackerError::Storage(e)
                }
            })?;

        let id = self.conn.last_insert_rowid();
        info!("Added custom exercise '{}' ({}) as {}", name, category, id);
        Ok(Exercise { id, name, category, photo_path, is_custom: true })
    }

    pub fn get_exercise(&self, id: i64) -> TrackerResult<Exercise> {
        self.conn
            .query_row(
                &format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?1"),
                params![id],
                row_to_exercise,
            )
            .optional()?
            .ok_or_else(|| TrackerError::NotFound(format!("exercise {}", id)))
    }

    /// Exact-name lookup
    pub fn find_exercise_by_name(&self, name: &str) -> TrackerResult<Option<Exercise>> {
        let exercise = self
            .conn
            .query_row(
                &format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE name = ?1"),
                params![name.trim()],
                row_to_exercise,
            )
            .optional()?;
        Ok(exercise)
    }
}
