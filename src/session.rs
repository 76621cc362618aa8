//! Workout session - sets collected in memory, committed at "finish workout"
//!
//! Commit is a plain sequence of inserts. When one fails the loop stops and
//! everything inserted before it stays in the store; there is no rollback.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::LogStore;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{NewWorkoutSet, WorkoutSet, validate_load};

/// A set that has been performed but not stored yet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingSet {
    pub weight: f64,
    pub reps: i32,
}

impl FromStr for PendingSet {
    type Err = TrackerError;

    /// `60x10`, `62.5×8`, `0x12` (bodyweight)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TrackerError::validation(format!("expected WEIGHTxREPS, got '{}'", s));
        let (weight, reps) = s
            .trim()
            .split_once(['x', 'X', '×'])
            .ok_or_else(invalid)?;
        let weight: f64 = weight.trim().replace(',', ".").parse().map_err(|_| invalid())?;
        let reps: i32 = reps.trim().parse().map_err(|_| invalid())?;
        validate_load(weight, reps)?;
        Ok(PendingSet { weight, reps })
    }
}

/// Batch commit stopped part-way
#[derive(Debug, thiserror::Error)]
#[error("set {failed_set_number} was not saved ({} saved before it): {source}", .committed.len())]
pub struct SessionError {
    /// Sets that reached the store before the failure
    pub committed: Vec<WorkoutSet>,
    pub failed_set_number: i32,
    #[source]
    pub source: TrackerError,
}

/// Sets of one exercise accumulated between start and finish
#[derive(Debug, Clone)]
pub struct WorkoutSession {
    user_id: i64,
    exercise_id: i64,
    sets: Vec<PendingSet>,
}

impl WorkoutSession {
    pub fn new(user_id: i64, exercise_id: i64) -> Self {
        Self { user_id, exercise_id, sets: Vec::new() }
    }

    /// Buffer one set and return its 1-based number.
    /// Rejected sets do not use up a number.
    pub fn add_set(&mut self, weight: f64, reps: i32) -> TrackerResult<i32> {
        validate_load(weight, reps)?;
        self.sets.push(PendingSet { weight, reps });
        Ok(self.sets.len() as i32)
    }

    pub fn sets(&self) -> &[PendingSet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Insert the buffered sets in order, numbered 1..n.
    pub fn finish<S: LogStore + ?Sized>(self, store: &S) -> Result<Vec<WorkoutSet>, SessionError> {
        if self.sets.is_empty() {
            return Err(SessionError {
                committed: Vec::new(),
                failed_set_number: 1,
                source: TrackerError::validation("add at least one set before finishing"),
            });
        }

        let mut committed = Vec::with_capacity(self.sets.len());
        for (i, pending) in self.sets.iter().enumerate() {
            let set_number = i as i32 + 1;
            let new = NewWorkoutSet {
                user_id: self.user_id,
                exercise_id: self.exercise_id,
                set_number,
                weight: pending.weight,
                reps: pending.reps,
            };
            match store.append_set(&new) {
                Ok(stored) => committed.push(stored),
                Err(source) => {
                    warn!(
                        "Workout for user {} stopped at set {}: {} ({} sets kept)",
                        self.user_id,
                        set_number,
                        source,
                        committed.len()
                    );
                    return Err(SessionError { committed, failed_set_number: set_number, source });
                }
            }
        }

        info!(
            "Finished workout: user {}, exercise {}, {} sets",
            self.user_id,
            self.exercise_id,
            committed.len()
        );
        Ok(committed)
    }
}
