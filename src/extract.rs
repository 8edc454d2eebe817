use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::AppError;

/// JSON body extractor whose rejections render as the crate's JSON error shape.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        Ok(Self(value))
    }
}

/// Well-formed JSON of the wrong shape is a validation failure (422); anything else is a 400.
fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let message = rejection.body_text();
    match rejection {
        JsonRejection::JsonDataError(_) => AppError::UnprocessableEntity(message),
        _ if message.is_empty() => AppError::BadRequest("Invalid JSON body".to_string()),
        _ => AppError::BadRequest(message),
    }
}

/// A single UUID path segment (`/{id}`); malformed ids are a 400 rather than a plain-text reply.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Uuid);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|e| match e.status() {
                StatusCode::INTERNAL_SERVER_ERROR => AppError::Internal(anyhow::anyhow!(
                    "Path extraction failed: {}",
                    e.body_text()
                )),
                _ => AppError::BadRequest("Invalid id".to_string()),
            })?;
        Ok(Self(id))
    }
}
