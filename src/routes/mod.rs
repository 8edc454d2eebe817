mod auth;
mod courses;
mod gallery;
mod health;
mod profile;
mod registrations;
mod uploads;

use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /health`: liveness probe
/// - `/api/...`: JSON API (health, auth, profile, courses, registrations, gallery, uploads)
/// - `/uploads/...`, `/users/...`: stored images, served from `UPLOAD_DIR`
pub fn router(config: &Config) -> Router<AppState> {
    let upload_root = Path::new(&config.upload_dir);

    let api = Router::new()
        .merge(health::api_router())
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/courses", courses::router())
        .nest("/registrations", registrations::router())
        .nest("/gallery", gallery::router())
        .nest("/uploads", uploads::router());

    Router::new()
        .merge(health::root_router())
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(upload_root.join("uploads")))
        .nest_service("/users", ServeDir::new(upload_root.join("users")))
}
