//! Application Error Types
//!
//! The full membership error taxonomy with Axum integration. Validation and
//! authorization errors travel through the service layer unchanged; handlers
//! never downgrade them to generic failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not a member of the target guild")]
    NotMember,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Guild member limit reached")]
    LimitExceeded,

    #[error("Invalid invite code")]
    InvalidCode,

    #[error("Invite code has expired")]
    Expired,

    #[error("Invite code has no uses left")]
    Exhausted,

    #[error("Already a member of this guild")]
    AlreadyMember,

    #[error("Cannot leave a solo guild")]
    CannotLeaveSolo,

    #[error("Cannot kick a member out of their solo guild")]
    CannotKickFromSolo,

    #[error("Guild is not deletable")]
    NotDeletable,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl AppError {
    /// True for transient race losses the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

impl From<sqlx::Error> for AppError {
    /// Serialization failures and deadlocks surface as retryable conflicts;
    /// everything else stays a database error.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(code) = db_err.code() {
                if code == "40001" || code == "40P01" {
                    return AppError::Conflict("serialization failure".into());
                }
            }
        }
        AppError::Database(err)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 20001, msg.clone()),
            AppError::NotMember => (StatusCode::NOT_FOUND, 20002, self.to_string()),
            AppError::PermissionDenied(msg) => (StatusCode::FORBIDDEN, 20003, msg.clone()),
            AppError::LimitExceeded => (StatusCode::PAYMENT_REQUIRED, 20004, self.to_string()),
            AppError::InvalidCode => (StatusCode::UNPROCESSABLE_ENTITY, 20005, self.to_string()),
            AppError::Expired => (StatusCode::UNPROCESSABLE_ENTITY, 20006, self.to_string()),
            AppError::Exhausted => (StatusCode::UNPROCESSABLE_ENTITY, 20007, self.to_string()),
            AppError::AlreadyMember => (StatusCode::CONFLICT, 20008, self.to_string()),
            AppError::CannotLeaveSolo => (StatusCode::BAD_REQUEST, 20009, self.to_string()),
            AppError::CannotKickFromSolo => (StatusCode::BAD_REQUEST, 20010, self.to_string()),
            AppError::NotDeletable => (StatusCode::BAD_REQUEST, 20011, self.to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, 20012, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, 10003, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 10002, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, 10007, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
        };

        let body = ErrorResponse { code, message };

        (status, Json(body)).into_response()
    }
}
