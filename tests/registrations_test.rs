mod common;

use axum::Router;
use axum::http::StatusCode;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use common::{
    admin_token, call, create_course, create_session, delete_with_auth, get_with_auth, json_body,
    listed_session, patch_with_auth, post_json, signup_and_signin, test_app,
};
use studio_api::entities::registration;

async fn register(app: &Router, token: &str, session_id: &str) -> (StatusCode, String) {
    call(
        app,
        "POST",
        &format!("/api/courses/{session_id}/register"),
        Some(token),
        None,
    )
    .await
}

async fn stored_registrations(db: &DatabaseConnection, session_id: &str) -> u64 {
    let id = uuid::Uuid::parse_str(session_id).unwrap_or_default();
    registration::Entity::find()
        .filter(registration::Column::SessionId.eq(id))
        .count(db)
        .await
        .unwrap_or_default()
}

/// An admin token plus one upcoming session with `seats` seats.
async fn setup(app: &Router, db: &DatabaseConnection, seats: i32) -> (String, String) {
    let admin = admin_token(app, db).await;
    let course_id = create_course(app, &admin, "dreiekurs").await;
    let session_id = create_session(app, &admin, &course_id, 5, seats).await;
    (admin, session_id)
}

// ─────────────────────────────────────────────────────────────────────────────
// Registering
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn registration_starts_unapproved_and_reduces_availability() {
    let (app, db) = test_app().await;
    let (_admin, session_id) = setup(&app, &db, 3).await;
    let token = signup_and_signin(&app, "ola@example.no").await;

    let (status, body) = register(&app, &token, &session_id).await;
    assert_eq!(status, StatusCode::CREATED);
    let json = json_body(&body);
    assert_eq!(json["sessionId"], session_id.as_str());
    assert_eq!(json["approved"], false);

    let listed = listed_session(&app, &session_id).await.unwrap_or_default();
    assert_eq!(listed["registrationsCount"], 1);
    assert_eq!(listed["availableSeats"], 2);
}

#[tokio::test]
async fn registering_requires_authentication() {
    let (app, db) = test_app().await;
    let (_admin, session_id) = setup(&app, &db, 3).await;

    let (status, _) = post_json(
        &app,
        &format!("/api/courses/{session_id}/register"),
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(stored_registrations(&db, &session_id).await, 0);
}

#[tokio::test]
async fn registering_for_unknown_session_is_not_found() {
    let (app, _db) = test_app().await;
    let token = signup_and_signin(&app, "ola@example.no").await;

    let (status, body) = register(&app, &token, &uuid::Uuid::new_v4().to_string()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body)["error"], "Session not found");
}

#[tokio::test]
async fn duplicate_registration_is_conflict_and_stores_one_row() {
    let (app, db) = test_app().await;
    let (_admin, session_id) = setup(&app, &db, 3).await;
    let token = signup_and_signin(&app, "ola@example.no").await;

    let (first, _) = register(&app, &token, &session_id).await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, body) = register(&app, &token, &session_id).await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(
        json_body(&body)["error"],
        "Already registered for this session"
    );
    assert_eq!(stored_registrations(&db, &session_id).await, 1);
}

#[tokio::test]
async fn full_session_is_conflict_without_insert() {
    let (app, db) = test_app().await;
    let (_admin, session_id) = setup(&app, &db, 1).await;

    let first = signup_and_signin(&app, "a@example.no").await;
    let (status, _) = register(&app, &first, &session_id).await;
    assert_eq!(status, StatusCode::CREATED);

    let second = signup_and_signin(&app, "b@example.no").await;
    let (status, body) = register(&app, &second, &session_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json_body(&body)["error"], "Session is full");
    assert_eq!(stored_registrations(&db, &session_id).await, 1);
}

#[tokio::test]
async fn zero_seat_session_is_always_full() {
    let (app, db) = test_app().await;
    let (_admin, session_id) = setup(&app, &db, 0).await;
    let token = signup_and_signin(&app, "ola@example.no").await;

    let (status, _) = register(&app, &token, &session_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(stored_registrations(&db, &session_id).await, 0);
}

#[tokio::test]
async fn past_session_rejects_registration() {
    let (app, db) = test_app().await;
    let admin = admin_token(&app, &db).await;
    let course_id = create_course(&app, &admin, "dreiekurs").await;
    let past = create_session(&app, &admin, &course_id, -1, 5).await;
    let token = signup_and_signin(&app, "ola@example.no").await;

    let (status, body) = register(&app, &token, &past).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(&body)["error"],
        "Cannot register for past sessions"
    );
    assert_eq!(stored_registrations(&db, &past).await, 0);
}

#[tokio::test]
async fn cancelled_seat_can_be_taken_by_someone_else() {
    let (app, db) = test_app().await;
    let (_admin, session_id) = setup(&app, &db, 2).await;

    let a = signup_and_signin(&app, "a@example.no").await;
    let b = signup_and_signin(&app, "b@example.no").await;
    let c = signup_and_signin(&app, "c@example.no").await;

    let (status, a_body) = register(&app, &a, &session_id).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = register(&app, &b, &session_id).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = register(&app, &c, &session_id).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let a_registration = json_body(&a_body)["id"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let (status, _) =
        delete_with_auth(&app, &format!("/api/registrations/{a_registration}"), &a).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = register(&app, &c, &session_id).await;
    assert_eq!(status, StatusCode::CREATED);

    let listed = listed_session(&app, &session_id).await.unwrap_or_default();
    assert_eq!(listed["registrationsCount"], 2);
    assert_eq!(listed["availableSeats"], 0);
}

#[tokio::test]
async fn concurrent_registrations_never_overbook() {
    let (app, db) = test_app().await;
    let (_admin, session_id) = setup(&app, &db, 1).await;

    let mut tokens = Vec::new();
    for email in ["a@example.no", "b@example.no", "c@example.no", "d@example.no"] {
        tokens.push(signup_and_signin(&app, email).await);
    }

    let (r1, r2, r3, r4) = tokio::join!(
        register(&app, &tokens[0], &session_id),
        register(&app, &tokens[1], &session_id),
        register(&app, &tokens[2], &session_id),
        register(&app, &tokens[3], &session_id),
    );

    let created = [r1.0, r2.0, r3.0, r4.0]
        .iter()
        .filter(|s| **s == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1);
    assert_eq!(stored_registrations(&db, &session_id).await, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Cancelling
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn only_owner_or_admin_may_cancel() {
    let (app, db) = test_app().await;
    let (admin, session_id) = setup(&app, &db, 3).await;

    let owner = signup_and_signin(&app, "owner@example.no").await;
    let other = signup_and_signin(&app, "other@example.no").await;

    let (_, body) = register(&app, &owner, &session_id).await;
    let first = json_body(&body)["id"].as_str().unwrap_or_default().to_string();

    let (status, body) =
        delete_with_auth(&app, &format!("/api/registrations/{first}"), &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        json_body(&body)["error"],
        "Forbidden: You can only delete your own registrations"
    );
    assert_eq!(stored_registrations(&db, &session_id).await, 1);

    let (status, body) =
        delete_with_auth(&app, &format!("/api/registrations/{first}"), &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body)["message"],
        "Registration deleted successfully"
    );

    let (_, body) = register(&app, &owner, &session_id).await;
    let second = json_body(&body)["id"].as_str().unwrap_or_default().to_string();
    let (status, _) =
        delete_with_auth(&app, &format!("/api/registrations/{second}"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored_registrations(&db, &session_id).await, 0);
}

#[tokio::test]
async fn cancelling_unknown_registration_is_not_found() {
    let (app, _db) = test_app().await;
    let token = signup_and_signin(&app, "ola@example.no").await;

    let (status, _) = delete_with_auth(
        &app,
        &format!("/api/registrations/{}", uuid::Uuid::new_v4()),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing and approval
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn my_registrations_include_session_and_course() {
    let (app, db) = test_app().await;
    let (_admin, session_id) = setup(&app, &db, 3).await;
    let token = signup_and_signin(&app, "ola@example.no").await;
    let other = signup_and_signin(&app, "kari@example.no").await;

    let (status, _) = register(&app, &token, &session_id).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = register(&app, &other, &session_id).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get_with_auth(&app, "/api/registrations/me", &token).await;
    assert_eq!(status, StatusCode::OK);

    let mine = json_body(&body).as_array().cloned().unwrap_or_default();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["session"]["id"], session_id.as_str());
    assert_eq!(mine[0]["course"]["slug"], "dreiekurs");
    assert_eq!(mine[0]["registration"]["approved"], false);
}

#[tokio::test]
async fn admin_listing_includes_user_details() {
    let (app, db) = test_app().await;
    let (admin, session_id) = setup(&app, &db, 3).await;
    let token = signup_and_signin(&app, "ola@example.no").await;
    let (status, _) = register(&app, &token, &session_id).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = get_with_auth(&app, "/api/registrations", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get_with_auth(&app, "/api/registrations", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert_eq!(json["total"], 1);
    assert_eq!(json["registrations"][0]["user"]["email"], "ola@example.no");
    assert_eq!(json["registrations"][0]["user"]["firstName"], "Kari");
    assert!(json["registrations"][0]["user"].get("passwordHash").is_none());
    assert_eq!(json["registrations"][0]["course"]["slug"], "dreiekurs");
}

#[tokio::test]
async fn admin_can_approve_registration() {
    let (app, db) = test_app().await;
    let (admin, session_id) = setup(&app, &db, 3).await;
    let token = signup_and_signin(&app, "ola@example.no").await;
    let (_, body) = register(&app, &token, &session_id).await;
    let id = json_body(&body)["id"].as_str().unwrap_or_default().to_string();
    let uri = format!("/api/registrations/{id}");

    let (status, _) = patch_with_auth(&app, &uri, &token, &json!({ "approved": true })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = patch_with_auth(&app, &uri, &admin, &json!({ "approved": true })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["approved"], true);

    let (status, _) = patch_with_auth(&app, &uri, &admin, &json!({ "approved": "yes" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
