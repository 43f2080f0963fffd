use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::auth::AuthError;

/// ApiError
///
/// Handler-level failures. Client-facing variants carry their own message; internal ones
/// are logged here and answered with a generic 500 so driver or hashing details never
/// reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = match self {
            ApiError::Auth(err) => return err.into_response(),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid email or password"),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason),
            ApiError::NotFound(reason) => (StatusCode::NOT_FOUND, reason),
            ApiError::Conflict(reason) => (StatusCode::CONFLICT, reason),
            ApiError::Database(_) | ApiError::Hashing(_) | ApiError::Task(_) => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };
        (status, Json(serde_json::json!({ "failed": reason }))).into_response()
    }
}

/// Unique-constraint violations surface as conflicts, everything else stays a database error.
pub fn conflict_on_unique(err: sqlx::Error, reason: &'static str) -> ApiError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::Conflict(reason),
        _ => ApiError::Database(err),
    }
}

/// A row pointing at a missing parent (e.g. the author of a still-valid token was deleted)
/// is reported as not found.
pub fn not_found_on_foreign_key(err: sqlx::Error, reason: &'static str) -> ApiError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => ApiError::NotFound(reason),
        _ => ApiError::Database(err),
    }
}
