#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde_json::{Value, json};
use tower::ServiceExt;

use studio_api::config::{Config, Environment};
use studio_api::entities::user;
use studio_api::state::AppState;

pub const PASSWORD: &str = "Keramikk#2026";

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_host: std::net::IpAddr::from([127, 0, 0, 1]),
        server_port: 0,
        environment: Environment::Development,
        log_level: "warn".to_string(),
        jwt_secret: "test-secret-key-for-testing-only-32chars".to_string(),
        session_ttl_secs: 3600,
        google_client_id: String::new(),
        google_client_secret: String::new(),
        google_redirect_uri: String::new(),
        github_client_id: String::new(),
        github_client_secret: String::new(),
        github_redirect_uri: String::new(),
        frontend_url: "http://localhost:3001".to_string(),
        upload_dir: std::env::temp_dir()
            .join(format!("studio-api-uploads-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
    }
}

/// Router over a fresh, migrated in-memory database, plus a handle on that database.
pub async fn test_app() -> (Router, DatabaseConnection) {
    test_app_with(test_config()).await
}

pub async fn test_app_with(config: Config) -> (Router, DatabaseConnection) {
    let db = sea_orm::Database::connect("sqlite::memory:")
        .await
        .unwrap_or_default();
    Migrator::up(&db, None).await.unwrap_or_default();

    let state = AppState {
        db: db.clone(),
        config: config.clone(),
    };

    (studio_api::routes::router(&config).with_state(state), db)
}

/// Send a request and return (status, headers, body).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = app.clone().oneshot(request).await.unwrap_or_default();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let body_str = String::from_utf8(body.to_vec()).unwrap_or_default();

    (status, headers, body_str)
}

/// Send a JSON (or empty) request, optionally authenticated with a bearer token.
pub async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_default(),
        None => builder.body(Body::empty()).unwrap_or_default(),
    };

    let (status, _headers, body) = send(app, request).await;
    (status, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    call(app, "GET", uri, None, None).await
}

pub async fn get_with_auth(app: &Router, uri: &str, token: &str) -> (StatusCode, String) {
    call(app, "GET", uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, String) {
    call(app, "POST", uri, None, Some(body)).await
}

pub async fn post_with_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: &Value,
) -> (StatusCode, String) {
    call(app, "POST", uri, Some(token), Some(body)).await
}

pub async fn patch_with_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: &Value,
) -> (StatusCode, String) {
    call(app, "PATCH", uri, Some(token), Some(body)).await
}

pub async fn delete_with_auth(app: &Router, uri: &str, token: &str) -> (StatusCode, String) {
    call(app, "DELETE", uri, Some(token), None).await
}

pub fn json_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_default()
}

/// Sign up and sign in, returning the session token.
pub async fn signup_and_signin(app: &Router, email: &str) -> String {
    let (status, body) = post_json(
        app,
        "/api/auth/signup",
        &json!({
            "firstName": "Kari",
            "lastName": "Nordmann",
            "email": email,
            "password": PASSWORD,
            "passwordConfirm": PASSWORD,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");

    let (status, body) = post_json(
        app,
        "/api/auth/signin",
        &json!({ "email": email, "password": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signin failed: {body}");
    json_body(&body)["token"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Promote an existing user to admin directly in the database.
pub async fn make_admin(db: &DatabaseConnection, email: &str) {
    let found = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .unwrap_or_default();
    assert!(found.is_some(), "no user with email {email}");
    if let Some(found) = found {
        let mut active: user::ActiveModel = found.into();
        active.role = Set("admin".to_string());
        assert!(active.update(db).await.is_ok());
    }
}

/// Sign up an admin and return its session token.
pub async fn admin_token(app: &Router, db: &DatabaseConnection) -> String {
    let token = signup_and_signin(app, "admin@studio.example.no").await;
    make_admin(db, "admin@studio.example.no").await;
    token
}

/// Create an active course as `admin`, returning its id.
pub async fn create_course(app: &Router, admin: &str, slug: &str) -> String {
    let (status, body) = post_with_auth(
        app,
        "/api/courses",
        admin,
        &json!({
            "title": { "no": "Dreiekurs", "en": "Wheel throwing" },
            "slug": slug,
            "description": { "no": "Lær å dreie.", "en": "Learn to throw." },
            "price": "1850.00",
            "location": "Verkstedet, Oslo",
            "category": "keramikk",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create course failed: {body}");
    json_body(&body)["id"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Schedule a session starting `days_from_now` days from now, returning its id.
pub async fn create_session(
    app: &Router,
    admin: &str,
    course_id: &str,
    days_from_now: i64,
    seats: i32,
) -> String {
    let start = chrono::Utc::now() + chrono::Duration::days(days_from_now);
    let end = start + chrono::Duration::hours(3);
    let (status, body) = post_with_auth(
        app,
        &format!("/api/courses/{course_id}/sessions"),
        admin,
        &json!({
            "startAt": start.to_rfc3339(),
            "endAt": end.to_rfc3339(),
            "seats": seats,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create session failed: {body}");
    json_body(&body)["id"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// The listed session with `session_id`, as returned by `GET /api/courses`.
pub async fn listed_session(app: &Router, session_id: &str) -> Option<Value> {
    let (status, body) = get(app, "/api/courses").await;
    assert_eq!(status, StatusCode::OK);
    json_body(&body)["courses"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|course| course["sessions"].as_array().cloned().unwrap_or_default())
        .find(|session| session["id"] == session_id)
}
