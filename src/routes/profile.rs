use std::path::Path;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::middleware::AuthUser;
use crate::dto::{ProfilePatch, ProfileResponse};
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::routes::uploads::{UPLOAD_BODY_LIMIT, read_image_field};
use crate::services::UserService;
use crate::services::uploads::{self, StoredImage};
use crate::state::AppState;

/// Build the profile route group: `/api/profile/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).patch(update_profile))
        .route(
            "/upload",
            post(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

#[derive(Serialize)]
struct ProfileUploadResponse {
    message: &'static str,
    url: String,
    filename: String,
    file: StoredImage,
}

/// `GET /api/profile`
async fn get_profile(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_model = UserService::find(&state.db, who.id).await?;
    Ok(Json(ProfileResponse::from(user_model)))
}

/// `PATCH /api/profile`
async fn update_profile(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    JsonBody(patch): JsonBody<ProfilePatch>,
) -> Result<Json<ProfileResponse>, AppError> {
    let updated = UserService::update_profile(&state.db, who.id, patch).await?;
    Ok(Json(ProfileResponse::from(updated)))
}

/// `POST /api/profile/upload`: multipart with a `file` field.
async fn upload_image(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (content_type, bytes) = read_image_field(multipart).await?;
    let stored = uploads::save_image(
        Path::new(&state.config.upload_dir),
        &bytes,
        &content_type,
        Some(who.id),
    )
    .await?;

    UserService::set_image(&state.db, who.id, &stored).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProfileUploadResponse {
            message: "Upload successful",
            url: stored.url.clone(),
            filename: stored.filename.clone(),
            file: stored,
        }),
    ))
}
