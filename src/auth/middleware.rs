use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sea_orm::EntityTrait;

use crate::auth::{UserIdentity, cookie, jwt};
use crate::entities::user;
use crate::error::AppError;
use crate::state::AppState;

/// Resolve the caller from the session cookie or bearer token.
///
/// Missing, malformed or expired tokens and tokens for deleted users all yield `None`;
/// only a store failure is an error.
///
/// # Errors
///
/// Returns `AppError::Internal` if the user lookup fails.
pub async fn current_user(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<UserIdentity>, AppError> {
    let Some(token) = cookie::session_token(&parts.headers) else {
        return Ok(None);
    };

    let Ok(claims) = jwt::validate_session_token(&token, &state.config.jwt_secret) else {
        tracing::debug!("Rejected invalid or expired session token");
        return Ok(None);
    };

    let Ok(user_id) = claims.user_id() else {
        return Ok(None);
    };

    let user_model = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(user_model.as_ref().map(UserIdentity::from))
}

/// Authenticated user; rejects with 401 when no valid session is present.
///
/// ```ignore
/// async fn handler(AuthUser(who): AuthUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserIdentity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        current_user(parts, state)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
    }
}

/// Requires the authenticated user to have the `"admin"` role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub UserIdentity);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;

        if !identity.is_admin() {
            return Err(AppError::Forbidden(
                "Forbidden: Admin access required".to_string(),
            ));
        }

        Ok(Self(identity))
    }
}

/// The caller if signed in; never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<UserIdentity>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts, state).await?))
    }
}
