//! REST handlers. Each one locks the store, calls one collaborator and
//! serialises the result; formatting and grouping live in `analytics`.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::{ApiJson, AppState};
use crate::analytics::{DaySummary, UserStats, compute_stats, group_by_day, take_days};
use crate::config::DEFAULT_HISTORY_DAYS;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Exercise, NewExercise, NewUser, NewWorkoutSet, User, WorkoutSet};
use crate::session::{PendingSet, SessionError, WorkoutSession};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Number of days, newest first
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct FinishWorkoutRequest {
    pub user_id: i64,
    pub exercise_id: i64,
    pub sets: Vec<PendingSet>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewUser>,
) -> TrackerResult<Json<User>> {
    let db = state.db.lock().await;
    Ok(Json(db.get_or_create_user(&new)?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(telegram_id): Path<i64>,
) -> TrackerResult<Json<User>> {
    let db = state.db.lock().await;
    Ok(Json(db.get_user_by_telegram_id(telegram_id)?))
}

pub async fn list_exercises(State(state): State<AppState>) -> TrackerResult<Json<Vec<Exercise>>> {
    let db = state.db.lock().await;
    Ok(Json(db.list_exercises()?))
}

pub async fn create_exercise(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewExercise>,
) -> TrackerResult<(StatusCode, Json<Exercise>)> {
    let db = state.db.lock().await;
    let exercise = db.create_exercise(&new)?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

pub async fn create_workout_log(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewWorkoutSet>,
) -> TrackerResult<(StatusCode, Json<WorkoutSet>)> {
    let db = state.db.lock().await;
    let stored = db.append_set(&new)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// "Finish workout": the whole session in one request, numbered 1..n
pub async fn finish_workout(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FinishWorkoutRequest>,
) -> Response {
    let mut session = WorkoutSession::new(request.user_id, request.exercise_id);
    for set in &request.sets {
        if let Err(e) = session.add_set(set.weight, set.reps) {
            return e.into_response();
        }
    }

    let db = state.db.lock().await;
    match session.finish(&*db) {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_workout_history(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> TrackerResult<Json<Vec<DaySummary>>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_DAYS);
    if limit == 0 {
        return Err(TrackerError::validation("limit must be positive"));
    }

    let rows = {
        let db = state.db.lock().await;
        db.get_user(user_id)?;
        db.get_user_logs(user_id, None)?
    };
    let days = take_days(group_by_day(&rows, state.utc_offset), Some(limit));
    Ok(Json(days))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> TrackerResult<Json<UserStats>> {
    let rows = {
        let db = state.db.lock().await;
        db.get_user(user_id)?;
        db.get_user_logs(user_id, None)?
    };
    Ok(Json(compute_stats(&rows, state.utc_offset)))
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        info!(
            "Workout batch failed at set {} with {} sets kept",
            self.failed_set_number,
            self.committed.len()
        );
        let body = json!({
            "error": self.source.public_message(),
            "kind": self.source.kind(),
            "failed_set_number": self.failed_set_number,
            "committed": self.committed,
        });
        (self.source.status(), Json(body)).into_response()
    }
}
