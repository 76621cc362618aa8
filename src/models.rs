//! Records stored in and read from the database

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::exercises::Category;

/// Chat-platform user, created on first contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub telegram_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> TrackerResult<()> {
        if self.telegram_id <= 0 {
            return Err(TrackerError::validation("telegram_id must be positive"));
        }
        Ok(())
    }
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub photo_path: Option<String>,
    pub is_custom: bool,
}

/// User submission for the catalog. Category stays a string until validated.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExercise {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub photo_path: Option<String>,
}

impl NewExercise {
    /// Returns the trimmed name and parsed category.
    pub fn validate(&self) -> TrackerResult<(String, Category)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TrackerError::validation("exercise name must not be empty"));
        }
        let category = self.category.parse::<Category>()?;
        Ok((name.to_string(), category))
    }

    /// Blank photo references are treated as absent.
    pub fn photo(&self) -> Option<&str> {
        self.photo_path.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}

/// One logged set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub set_number: i32,
    /// Kilograms; 0 means bodyweight
    pub weight: f64,
    pub reps: i32,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkoutSet {
    pub user_id: i64,
    pub exercise_id: i64,
    pub set_number: i32,
    pub weight: f64,
    pub reps: i32,
}

impl NewWorkoutSet {
    pub fn validate(&self) -> TrackerResult<()> {
        validate_load(self.weight, self.reps)?;
        if self.set_number <= 0 {
            return Err(TrackerError::validation("set_number must be positive"));
        }
        Ok(())
    }
}

/// Shared by the store and the session buffer.
pub fn validate_load(weight: f64, reps: i32) -> TrackerResult<()> {
    if reps <= 0 {
        return Err(TrackerError::validation("reps must be positive"));
    }
    if !weight.is_finite() || weight < 0.0 {
        return Err(TrackerError::validation("weight must be a non-negative number"));
    }
    Ok(())
}

/// A set joined with its exercise, as read back for history and statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRow {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub category: Category,
    pub photo_path: Option<String>,
    pub set_number: i32,
    pub weight: f64,
    pub reps: i32,
    pub date: DateTime<Utc>,
}
