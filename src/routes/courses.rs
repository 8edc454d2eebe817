use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::auth::UserIdentity;
use crate::auth::middleware::{AdminUser, AuthUser, MaybeUser};
use crate::dto::{
    CourseInput, CoursePatch, CoursesQuery, CoursesResponse, SessionInput, SessionPatch,
};
use crate::error::AppError;
use crate::extract::{IdPath, JsonBody};
use crate::services::availability::{self, CourseFilter};
use crate::services::{CourseService, RegistrationService};
use crate::state::AppState;

/// Build the course route group: `/api/courses/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/{id}", patch(update_course).delete(delete_course))
        .route("/{id}/sessions", post(create_session))
        .route("/{id}/register", post(register))
        .route(
            "/sessions/{session_id}",
            patch(update_session).delete(delete_session),
        )
}

// ============================================================================
// Catalog
// ============================================================================

/// `GET /api/courses[?includeInactive=true]`
async fn list_courses(
    State(state): State<AppState>,
    MaybeUser(who): MaybeUser,
    Query(query): Query<CoursesQuery>,
) -> Result<Json<CoursesResponse>, AppError> {
    if query.include_inactive && !who.as_ref().is_some_and(UserIdentity::is_admin) {
        return Err(AppError::Forbidden(
            "Forbidden: Admin access required".to_string(),
        ));
    }

    let courses = availability::courses_with_sessions(
        &state.db,
        CourseFilter {
            course_id: None,
            include_inactive: query.include_inactive,
        },
    )
    .await?;

    Ok(Json(CoursesResponse { courses }))
}

/// `POST /api/courses/{sessionId}/register`
async fn register(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    IdPath(session_id): IdPath,
) -> Result<impl IntoResponse, AppError> {
    let created = RegistrationService::register(&state.db, &who, session_id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// ============================================================================
// Course administration
// ============================================================================

/// `POST /api/courses`
async fn create_course(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    JsonBody(body): JsonBody<CourseInput>,
) -> Result<impl IntoResponse, AppError> {
    let created = CourseService::create(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /api/courses/{id}`
async fn update_course(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    IdPath(id): IdPath,
    JsonBody(body): JsonBody<CoursePatch>,
) -> Result<impl IntoResponse, AppError> {
    let updated = CourseService::update(&state.db, id, body).await?;
    Ok(Json(updated))
}

/// `DELETE /api/courses/{id}`
async fn delete_course(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    CourseService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Session administration
// ============================================================================

/// `POST /api/courses/{id}/sessions`
async fn create_session(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    IdPath(course_id): IdPath,
    JsonBody(body): JsonBody<SessionInput>,
) -> Result<impl IntoResponse, AppError> {
    let created = CourseService::create_session(&state.db, course_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /api/courses/sessions/{sessionId}`
async fn update_session(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    IdPath(session_id): IdPath,
    JsonBody(body): JsonBody<SessionPatch>,
) -> Result<impl IntoResponse, AppError> {
    let updated = CourseService::update_session(&state.db, session_id, body).await?;
    Ok(Json(updated))
}

/// `DELETE /api/courses/sessions/{sessionId}`
async fn delete_session(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    IdPath(session_id): IdPath,
) -> Result<StatusCode, AppError> {
    CourseService::delete_session(&state.db, session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
