use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Deserialize;

use crate::auth::middleware::MaybeUser;
use crate::auth::oauth::Provider;
use crate::auth::{UserIdentity, cookie, jwt, password};
use crate::dto::{
    ForgotPasswordRequest, MessageResponse, SessionResponse, SigninRequest, SigninResponse,
    SignupRequest, SignupResponse,
};
use crate::entities::user;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::services::UserService;
use crate::state::AppState;

const RESET_MESSAGE: &str = "If an account with that email exists, a reset link has been sent.";

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the auth route group: `/api/auth/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/session", get(session))
        .route("/forgot-password", post(forgot_password))
        .route("/oauth/{provider}", get(oauth_start))
        .route("/oauth/{provider}/callback", get(oauth_callback))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OAuthStartQuery {
    redirect_uri: Option<String>,
}

#[derive(Deserialize)]
struct OAuthCallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Where to send the browser after an OAuth sign-in. Only site-relative paths and URLs on
/// the frontend origin are honoured; anything else falls back to the frontend root.
fn post_login_target(requested: Option<&str>, frontend_url: &str) -> String {
    let base = frontend_url.trim_end_matches('/');
    match requested {
        Some(uri) if uri.starts_with('/') && !uri.starts_with("//") => format!("{base}{uri}"),
        Some(uri) if !base.is_empty() && (uri == base || uri.starts_with(&format!("{base}/"))) => {
            uri.to_string()
        }
        _ => frontend_url.to_string(),
    }
}

fn signin_error_target(frontend_url: &str, error: &str) -> String {
    format!(
        "{}/signin?error={}",
        frontend_url.trim_end_matches('/'),
        urlencoding::encode(error)
    )
}

fn parse_provider(slug: &str) -> Result<Provider, AppError> {
    Provider::from_slug(slug)
        .ok_or_else(|| AppError::NotFound(format!("Unknown OAuth provider: {slug}")))
}

/// Issue a session token for `user_model` and attach it to the cookie jar.
fn start_session(
    state: &AppState,
    jar: CookieJar,
    user_model: &user::Model,
) -> Result<(CookieJar, UserIdentity, String), AppError> {
    let identity = UserIdentity::from(user_model);
    let token = jwt::issue_session_token(&identity, &state.config)?;
    let jar = jar.add(cookie::session_cookie(token.clone(), &state.config));
    Ok((jar, identity, token))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/auth/signup`
async fn signup(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = UserService::signup(&state.db, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: created.id,
            email: created.email,
        }),
    ))
}

/// `POST /api/auth/signin`
async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(body): JsonBody<SigninRequest>,
) -> Result<(CookieJar, Json<SigninResponse>), AppError> {
    let user_model = UserService::authenticate(&state.db, &body.email, &body.password).await?;
    let (jar, identity, token) = start_session(&state, jar, &user_model)?;

    tracing::info!(user_id = %identity.id, "User signed in");
    Ok((
        jar,
        Json(SigninResponse {
            user: identity,
            token,
        }),
    ))
}

/// `POST /api/auth/signout`
///
/// Tokens are stateless, so signing out only drops the cookie.
async fn signout(jar: CookieJar) -> (StatusCode, CookieJar) {
    (StatusCode::NO_CONTENT, jar.remove(cookie::removal_cookie()))
}

/// `GET /api/auth/session`
async fn session(MaybeUser(user): MaybeUser) -> Json<SessionResponse> {
    Json(SessionResponse { user })
}

/// `POST /api/auth/forgot-password`
///
/// Always answers with the same message so the endpoint cannot be used to probe for accounts.
async fn forgot_password(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = body.email.trim().to_lowercase();
    password::validate_email(&email).map_err(AppError::UnprocessableEntity)?;

    let account = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;

    if let Some(account) = account.filter(|u| u.password_hash.is_some()) {
        // TODO: issue a reset token and e-mail it once an outbound mail provider is configured.
        tracing::info!(user_id = %account.id, "Password reset requested");
    }

    Ok(Json(MessageResponse::new(RESET_MESSAGE)))
}

/// `GET /api/auth/oauth/{provider}`
async fn oauth_start(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthStartQuery>,
) -> Result<Redirect, AppError> {
    let provider = parse_provider(&provider)?;
    if !provider.is_configured(&state.config) {
        return Err(AppError::UnprocessableEntity(format!(
            "{} OAuth is not configured.",
            provider.as_str()
        )));
    }

    let state_token = jwt::generate_oauth_state(
        &state.config.jwt_secret,
        provider.as_str(),
        query.redirect_uri.as_deref(),
    )?;
    let url = provider.authorize_url(&state.config, state_token)?;

    Ok(Redirect::to(&url))
}

/// `GET /api/auth/oauth/{provider}/callback`
async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let provider = parse_provider(&provider)?;

    if let Some(error) = query.error {
        tracing::info!(provider = provider.as_str(), %error, "OAuth sign-in declined");
        return Ok(
            Redirect::to(&signin_error_target(&state.config.frontend_url, &error)).into_response(),
        );
    }

    let (Some(code), Some(state_param)) = (query.code, query.state) else {
        return Err(AppError::BadRequest(
            "Missing OAuth code or state".to_string(),
        ));
    };

    let claims =
        jwt::validate_oauth_state(&state_param, &state.config.jwt_secret, provider.as_str())
            .map_err(|_| AppError::BadRequest("Invalid or expired OAuth state.".to_string()))?;

    let profile = provider
        .fetch_profile(&state.config, code)
        .await
        .map_err(|e| {
            tracing::warn!(provider = provider.as_str(), error = %e, "OAuth exchange failed");
            AppError::BadRequest(format!(
                "Failed to complete sign-in with {}",
                provider.as_str()
            ))
        })?;

    let user_model = UserService::find_or_create_oauth_user(&state.db, provider, &profile).await?;
    let (jar, identity, _token) = start_session(&state, jar, &user_model)?;

    tracing::info!(user_id = %identity.id, provider = provider.as_str(), "User signed in");

    let target = post_login_target(claims.redirect_uri.as_deref(), &state.config.frontend_url);
    Ok((jar, Redirect::to(&target)).into_response())
}
