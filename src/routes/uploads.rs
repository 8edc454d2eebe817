use std::path::Path;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::middleware::AdminUser;
use crate::error::AppError;
use crate::services::uploads::{self, MAX_IMAGE_SIZE, StoredImage};
use crate::state::AppState;

/// Request body cap for upload routes: the image limit plus room for multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_SIZE + 1024 * 1024;

/// Build the upload route group: `/api/uploads`
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        post(upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
    )
}

#[derive(Serialize)]
struct UploadResponse {
    message: &'static str,
    file: StoredImage,
}

/// Pull the `file` field out of a multipart body as `(content type, bytes)`.
///
/// # Errors
///
/// `BadRequest` on malformed multipart data or when no `file` field is present.
pub async fn read_image_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Could not read file: {e}")))?;
            return Ok((content_type, bytes.to_vec()));
        }
    }

    Err(AppError::BadRequest("File is required".to_string()))
}

/// `POST /api/uploads`: admin image upload, stored under `uploads/`.
async fn upload(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (content_type, bytes) = read_image_field(multipart).await?;
    let stored = uploads::save_image(
        Path::new(&state.config.upload_dir),
        &bytes,
        &content_type,
        None,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Upload successful",
            file: stored,
        }),
    ))
}
