//! REST API for the web app / Telegram Mini App

pub mod handlers;

use std::path::PathBuf;

use axum::{
    Router,
    extract::FromRequest,
    routing::{get, post},
};
use chrono::FixedOffset;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::config::ApiConfig;
use crate::db::SharedDb;
use crate::error::TrackerError;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: SharedDb,
    /// Offset in which calendar days are counted
    pub utc_offset: FixedOffset,
}

impl AppState {
    pub fn new(db: SharedDb, utc_offset: FixedOffset) -> Self {
        Self { db, utc_offset }
    }
}

/// JSON request body whose rejections answer like any other validation error
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(TrackerError))]
pub struct ApiJson<T>(pub T);

/// API routes, plus the built front-end for every other path when given
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let api = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/users", post(handlers::create_user))
        .route("/api/users/{telegram_id}", get(handlers::get_user))
        .route(
            "/api/exercises",
            get(handlers::list_exercises).post(handlers::create_exercise),
        )
        .route("/api/workout-logs", post(handlers::create_workout_log))
        .route("/api/workout-logs/{user_id}", get(handlers::get_workout_history))
        .route("/api/workouts", post(handlers::finish_workout))
        .route("/api/stats/{user_id}", get(handlers::get_stats))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    // The Mini App is served from another origin
    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl+C
pub async fn serve(db: SharedDb, config: ApiConfig) -> anyhow::Result<()> {
    let state = AppState::new(db, config.utc_offset);
    if let Some(dir) = &config.static_dir {
        info!("Serving web app from {}", dir.display());
    }
    let app = router(state, config.static_dir.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!("API listening on http://{}/api", config.bind_address);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down API");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{NewUser, NewWorkoutSet};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::{Duration, TimeZone, Utc};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> (Router, SharedDb) {
        let db = Database::open_in_memory().unwrap().into_shared();
        let state = AppState::new(db.clone(), FixedOffset::east_opt(0).unwrap());
        (router(state, None), db)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn register(app: &Router, telegram_id: i64) -> i64 {
        let (status, user) = send(
            app,
            "POST",
            "/api/users",
            Some(json!({ "telegram_id": telegram_id, "username": "lifter", "first_name": "Аня" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        user["id"].as_i64().unwrap()
    }

    async fn exercise_id(db: &SharedDb, name: &str) -> i64 {
        db.lock().await.find_exercise_by_name(name).unwrap().unwrap().id
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_user_create_and_fetch() {
        let (app, _) = app();
        let id = register(&app, 555).await;
        // Second contact returns the same user
        assert_eq!(register(&app, 555).await, id);

        let (status, user) = send(&app, "GET", "/api/users/555", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["id"], id);
        assert_eq!(user["first_name"], "Аня");
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/api/users/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_list_exercises() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/api/exercises", None).await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), crate::exercises::SEED_EXERCISES.len());
        assert_eq!(list[0]["is_custom"], false);
        assert!(list[0]["category"].is_string());
    }

    #[tokio::test]
    async fn test_create_exercise_and_duplicate() {
        let (app, _) = app();
        let payload = json!({ "name": "Жим гантелей", "category": "chest", "photo_path": null });
        let (status, created) = send(&app, "POST", "/api/exercises", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["is_custom"], true);
        assert_eq!(created["category"], "chest");

        let (status, body) = send(&app, "POST", "/api/exercises", Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "conflict");

        let (_, list) = send(&app, "GET", "/api/exercises", None).await;
        assert_eq!(list.as_array().unwrap().len(), crate::exercises::SEED_EXERCISES.len() + 1);
    }

    #[tokio::test]
    async fn test_create_exercise_bad_category() {
        let (app, _) = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/exercises",
            Some(json!({ "name": "Бег", "category": "cardio" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");
    }

    #[tokio::test]
    async fn test_log_with_zero_reps_is_rejected_and_not_stored() {
        let (app, db) = app();
        let user_id = register(&app, 1).await;
        let bench = exercise_id(&db, "Жим лежа").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/workout-logs",
            Some(json!({ "user_id": user_id, "exercise_id": bench, "set_number": 1, "weight": 50.0, "reps": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");

        let (_, history) = send(&app, "GET", &format!("/api/workout-logs/{}", user_id), None).await;
        assert!(history.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_log_with_unknown_exercise_is_reference_error() {
        let (app, _) = app();
        let user_id = register(&app, 1).await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/workout-logs",
            Some(json!({ "user_id": user_id, "exercise_id": 999, "set_number": 1, "weight": 50.0, "reps": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "reference");
    }

    #[tokio::test]
    async fn test_history_groups_two_days_newest_first() {
        let (app, db) = app();
        let user_id = register(&app, 1).await;
        let bench = exercise_id(&db, "Жим лежа").await;
        let day_one = Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap();
        {
            let db = db.lock().await;
            for (i, at) in [day_one, day_one + Duration::minutes(3)].into_iter().enumerate() {
                let set = NewWorkoutSet { user_id, exercise_id: bench, set_number: i as i32 + 1, weight: 0.0, reps: 10 };
                db.append_set_at(&set, at).unwrap();
            }
            let set = NewWorkoutSet { user_id, exercise_id: bench, set_number: 1, weight: 70.0, reps: 5 };
            db.append_set_at(&set, day_one + Duration::days(1)).unwrap();
        }

        let (status, body) = send(&app, "GET", &format!("/api/workout-logs/{}", user_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let days = body.as_array().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0]["date"], "2026-09-02");
        assert_eq!(days[1]["date"], "2026-09-01");
        assert_eq!(days[0]["exercises"][0]["max_weight"], "70 kg");
        assert_eq!(days[1]["exercises"][0]["max_weight"], "Bodyweight");
        assert_eq!(days[1]["exercises"][0]["sets_detail"], "1×10(0kg), 2×10(0kg)");
        assert_eq!(days[1]["total_reps"], 20);

        let (_, limited) = send(&app, "GET", &format!("/api/workout-logs/{}?limit=1", user_id), None).await;
        assert_eq!(limited.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "GET", &format!("/api/workout-logs/{}?limit=0", user_id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_history_for_unknown_user() {
        let (app, _) = app();
        let (status, _) = send(&app, "GET", "/api/workout-logs/77", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats_for_unknown_user() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/api/stats/77", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_missing_fields_are_validation_errors() {
        let (app, db) = app();
        let user_id = register(&app, 1).await;
        let bench = exercise_id(&db, "Жим лежа").await;

        let cases = [
            (
                "/api/workout-logs",
                json!({ "user_id": user_id, "exercise_id": bench, "set_number": 1, "weight": 10.0 }),
            ),
            ("/api/workout-logs", json!({ "user_id": user_id, "exercise_id": bench, "set_number": 1, "weight": "heavy", "reps": 5 })),
            ("/api/exercises", json!({ "category": "chest" })),
            ("/api/users", json!({})),
            ("/api/workouts", json!({ "user_id": user_id, "exercise_id": bench })),
        ];
        for (uri, payload) in cases {
            let (status, body) = send(&app, "POST", uri, Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["kind"], "validation", "{}", uri);
            assert!(body["error"].is_string());
        }
        assert!(db.lock().await.get_user_logs(user_id, None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let (app, _) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/users")
            .header("content-type", "application/json")
            .body(Body::from("{\"telegram_id\": 1"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["kind"], "validation");
    }

    #[tokio::test]
    async fn test_negative_zero_weight_is_stored_as_zero() {
        let (app, db) = app();
        let user_id = register(&app, 1).await;
        let bench = exercise_id(&db, "Жим лежа").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/workout-logs",
            Some(json!({ "user_id": user_id, "exercise_id": bench, "set_number": 1, "weight": -0.0, "reps": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["weight"].as_f64().unwrap().is_sign_positive());

        let (status, body) = send(
            &app,
            "POST",
            "/api/workouts",
            Some(json!({ "user_id": user_id, "exercise_id": bench, "sets": [{ "weight": -0.0, "reps": 5 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body[0]["weight"].as_f64().unwrap().is_sign_positive());
    }

    #[tokio::test]
    async fn test_finish_workout_batch() {
        let (app, db) = app();
        let user_id = register(&app, 1).await;
        let squat = exercise_id(&db, "Приседания со штангой").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/workouts",
            Some(json!({
                "user_id": user_id,
                "exercise_id": squat,
                "sets": [{ "weight": 100.0, "reps": 5 }, { "weight": 105.0, "reps": 4 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let stored = body.as_array().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1]["set_number"], 2);
    }

    #[tokio::test]
    async fn test_finish_workout_rejects_invalid_set_before_commit() {
        let (app, db) = app();
        let user_id = register(&app, 1).await;
        let squat = exercise_id(&db, "Приседания со штангой").await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/workouts",
            Some(json!({
                "user_id": user_id,
                "exercise_id": squat,
                "sets": [{ "weight": 100.0, "reps": 5 }, { "weight": 100.0, "reps": 0 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(db.lock().await.get_user_logs(user_id, None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finish_workout_unknown_exercise_reports_committed() {
        let (app, _) = app();
        let user_id = register(&app, 1).await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/workouts",
            Some(json!({ "user_id": user_id, "exercise_id": 999, "sets": [{ "weight": 10.0, "reps": 5 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["failed_set_number"], 1);
        assert!(body["committed"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats() {
        let (app, db) = app();
        let user_id = register(&app, 1).await;
        let bench = exercise_id(&db, "Жим лежа").await;
        {
            let db = db.lock().await;
            let user = db.get_or_create_user(&NewUser { telegram_id: 1, username: None, first_name: None }).unwrap();
            assert_eq!(user.id, user_id);
            for (n, weight) in [(1, 60.0), (2, 70.0)] {
                let set = NewWorkoutSet { user_id, exercise_id: bench, set_number: n, weight, reps: 8 };
                db.append_set(&set).unwrap();
            }
        }

        let (status, stats) = send(&app, "GET", &format!("/api/stats/{}", user_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_workouts"], 1);
        assert_eq!(stats["unique_exercises"], 1);
        assert_eq!(stats["total_reps"], 16);
        assert_eq!(stats["exercises"][0]["max_weight"], 70.0);
        assert_eq!(stats["exercises"][0]["avg_weight"], 65.0);
    }
}
