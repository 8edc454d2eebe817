use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified application error type that maps to JSON HTTP responses.
///
/// Every failure renders as `{ "error": "<message>", "code": "<CODE>" }`.
#[derive(Debug)]
pub enum AppError {
    /// 400 Bad Request
    BadRequest(String),
    /// 401 Unauthorized
    Unauthorized(String),
    /// 403 Forbidden
    Forbidden(String),
    /// 404 Not Found
    NotFound(String),
    /// 400 Bad Request: a time-based precondition failed (e.g. the session already started)
    InvalidState(String),
    /// 409 Conflict
    Conflict(String),
    /// 422 Unprocessable Entity
    UnprocessableEntity(String),
    /// 500 Internal Server Error (wraps any error, logs details, returns generic message)
    Internal(anyhow::Error),
}

impl AppError {
    /// HTTP status this error renders with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidState(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            Self::BadRequest(msg) => ("BAD_REQUEST", msg),
            Self::Unauthorized(msg) => ("UNAUTHORIZED", msg),
            Self::Forbidden(msg) => ("FORBIDDEN", msg),
            Self::NotFound(msg) => ("NOT_FOUND", msg),
            Self::InvalidState(msg) => ("INVALID_STATE", msg),
            Self::Conflict(msg) => ("CONFLICT", msg),
            Self::UnprocessableEntity(msg) => ("VALIDATION_ERROR", msg),
            Self::Internal(err) => {
                tracing::error!("Internal server error: {err:#}");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        (
            status,
            Json(json!({
                "error": message,
                "code": code,
            })),
        )
            .into_response()
    }
}

/// Allow `?` to automatically convert any `anyhow::Error` into `AppError::Internal`.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
