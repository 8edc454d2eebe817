use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::auth::middleware::AdminUser;
use crate::dto::{GalleryInput, GalleryListResponse, GalleryPatch, GalleryQuery};
use crate::error::AppError;
use crate::extract::{IdPath, JsonBody};
use crate::services::GalleryService;
use crate::state::AppState;

/// Build the gallery route group: `/api/gallery/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/{id}", patch(update_item).delete(delete_item))
}

/// `GET /api/gallery[?category=]`
async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> Result<Json<GalleryListResponse>, AppError> {
    let items = GalleryService::list(&state.db, query.category.as_deref()).await?;
    Ok(Json(GalleryListResponse {
        total: items.len(),
        items,
    }))
}

/// `POST /api/gallery`
async fn create_item(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    JsonBody(body): JsonBody<GalleryInput>,
) -> Result<impl IntoResponse, AppError> {
    let created = GalleryService::create(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /api/gallery/{id}`
async fn update_item(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody<GalleryPatch>,
) -> Result<impl IntoResponse, AppError> {
    let updated = GalleryService::update(&state.db, id, body).await?;
    Ok(Json(updated))
}

/// `DELETE /api/gallery/{id}`
async fn delete_item(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    GalleryService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
