use axum::extract::State;
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::auth::middleware::{AdminUser, AuthUser};
use crate::dto::{ApprovalRequest, MessageResponse, MyRegistration, RegistrationListResponse};
use crate::entities::registration;
use crate::error::AppError;
use crate::extract::{IdPath, JsonBody};
use crate::services::RegistrationService;
use crate::state::AppState;

/// Build the registration route group: `/api/registrations/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_registrations))
        .route("/me", get(my_registrations))
        .route("/{id}", delete(delete_registration).patch(set_approval))
}

/// `GET /api/registrations`
async fn list_registrations(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<RegistrationListResponse>, AppError> {
    let registrations = RegistrationService::list_all(&state.db).await?;
    Ok(Json(RegistrationListResponse {
        total: registrations.len(),
        registrations,
    }))
}

/// `GET /api/registrations/me`
async fn my_registrations(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
) -> Result<Json<Vec<MyRegistration>>, AppError> {
    let registrations = RegistrationService::list_for_user(&state.db, who.id).await?;
    Ok(Json(registrations))
}

/// `DELETE /api/registrations/{id}`: the owner cancels, or an admin removes.
async fn delete_registration(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, AppError> {
    RegistrationService::cancel(&state.db, &who, id).await?;
    Ok(Json(MessageResponse::new(
        "Registration deleted successfully",
    )))
}

/// `PATCH /api/registrations/{id}`
async fn set_approval(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody<ApprovalRequest>,
) -> Result<Json<registration::Model>, AppError> {
    let updated = RegistrationService::set_approved(&state.db, id, body.approved).await?;
    Ok(Json(updated))
}
