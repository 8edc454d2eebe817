use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

/// `GET /health`, answered without touching the database.
async fn liveness() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

/// `GET /api/health`
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

pub fn root_router() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}

pub fn api_router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
