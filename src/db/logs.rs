//! Append-only set log

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{Row, params, types::Type};
use tracing::warn;

use super::{Database, format_timestamp, is_foreign_key_violation, timestamp_column};
use crate::error::{TrackerError, TrackerResult};
use crate::exercises::Category;
use crate::models::{LogRow, NewWorkoutSet, WorkoutSet};

/// Where finished sets are committed to
pub trait LogStore {
    fn append_set(&self, set: &NewWorkoutSet) -> TrackerResult<WorkoutSet>;
}

impl LogStore for Database {
    fn append_set(&self, set: &NewWorkoutSet) -> TrackerResult<WorkoutSet> {
        Database::append_set(self, set)
    }
}

fn row_to_log(row: &Row<'_>) -> rusqlite::Result<LogRow> {
    let raw_category: String = row.get(5)?;
    let category = raw_category
        .parse::<Category>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    Ok(LogRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        exercise_id: row.get(2)?,
        exercise_name: row.get(3)?,
        category,
        photo_path: row.get(4)?,
        set_number: row.get(6)?,
        weight: row.get(7)?,
        reps: row.get(8)?,
        date: timestamp_column(row, 9)?,
    })
}

impl Database {
    /// Record one set now
    pub fn append_set(&self, set: &NewWorkoutSet) -> TrackerResult<WorkoutSet> {
        self.append_set_at(set, Utc::now())
    }

    /// Record one set with an explicit timestamp
    pub fn append_set_at(&self, set: &NewWorkoutSet, at: DateTime<Utc>) -> TrackerResult<WorkoutSet> {
        if let Err(e) = set.validate() {
            warn!("Rejected set for user {}: {}", set.user_id, e);
            return Err(e);
        }
        // Stored precision, so the returned record equals what is read back
        let at = at.trunc_subsecs(6);
        // -0.0 + 0.0 is +0.0; SQLite reads a negative zero back as 0
        let weight = set.weight + 0.0;

        self.conn
            .execute(
                "INSERT INTO workout_logs (user_id, exercise_id, set_number, weight, reps, date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    set.user_id,
                    set.exercise_id,
                    set.set_number,
                    weight,
                    set.reps,
                    format_timestamp(&at),
                ],
            )
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    TrackerError::Reference(format!(
                        "user {} or exercise {} does not exist",
                        set.user_id, set.exercise_id
                    ))
                } else {
                    TrackerError::Storage(e)
                }
            })?;

        Ok(WorkoutSet {
            id: self.conn.last_insert_rowid(),
            user_id: set.user_id,
            exercise_id: set.exercise_id,
            set_number: set.set_number,
            weight,
            reps: set.reps,
            date: at,
        })
    }

    /// All sets of a user joined with their exercise, newest first.
    /// `limit` caps the number of rows, not days.
    pub fn get_user_logs(&self, user_id: i64, limit: Option<usize>) -> TrackerResult<Vec<LogRow>> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(
            "SELECT wl.id, wl.user_id, wl.exercise_id, e.name, e.photo_path, e.category,
                    wl.set_number, wl.weight, wl.reps, wl.date
             FROM workout_logs wl
             JOIN exercises e ON wl.exercise_id = e.id
             WHERE wl.user_id = ?1
             ORDER BY wl.date DESC, wl.id DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![user_id, limit], row_to_log)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
