//! Error types shared by the store, the aggregator and both adapters

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Everything a tracker operation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Missing or out-of-range input: empty name, non-positive reps,
    /// negative weight, unknown category.
    #[error("validation error: {0}")]
    Validation(String),

    /// Duplicate exercise name.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unknown user or exercise referenced by a new record.
    #[error("unknown reference: {0}")]
    Reference(String),

    /// Lookup of something that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Failure inside SQLite itself.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

impl TrackerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TrackerError::Validation(msg.into())
    }

    /// Stable tag for API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            TrackerError::Validation(_) => "validation",
            TrackerError::Conflict(_) => "conflict",
            TrackerError::Reference(_) => "reference",
            TrackerError::NotFound(_) => "not_found",
            TrackerError::Storage(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            TrackerError::Validation(_) => StatusCode::BAD_REQUEST,
            TrackerError::Conflict(_) => StatusCode::CONFLICT,
            TrackerError::Reference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client. Storage details stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            TrackerError::Storage(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Unreadable bodies and missing or mistyped fields are bad input
impl From<JsonRejection> for TrackerError {
    fn from(rejection: JsonRejection) -> Self {
        TrackerError::Validation(rejection.body_text())
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        if let TrackerError::Storage(e) = &self {
            error!("Storage failure: {}", e);
        }
        let body = json!({
            "error": self.public_message(),
            "kind": self.kind(),
        });
        (self.status(), Json(body)).into_response()
    }
}
