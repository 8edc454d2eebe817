mod common;

use axum::Router;
use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{
    admin_token, delete_with_auth, get, json_body, patch_with_auth, post_with_auth,
    signup_and_signin, test_app,
};

fn item(title: &str, category: Option<&str>) -> Value {
    json!({
        "title": { "no": title, "en": title },
        "imageUrl": "/uploads/vase.jpg",
        "description": { "no": "Håndlaget", "en": "Handmade" },
        "price": "450",
        "category": category,
    })
}

async fn create_item(app: &Router, admin: &str, body: &Value) -> String {
    let (status, body) = post_with_auth(app, "/api/gallery", admin, body).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    json_body(&body)["id"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn empty_gallery_lists_nothing() {
    let (app, _db) = test_app().await;
    let (status, body) = get(&app, "/api/gallery").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({ "items": [], "total": 0 }));
}

#[tokio::test]
async fn gallery_lists_items_and_filters_by_category() {
    let (app, db) = test_app().await;
    let admin = admin_token(&app, &db).await;
    let _vase = create_item(&app, &admin, &item("Vase", Some("keramikk"))).await;
    let _bowl = create_item(&app, &admin, &item("Bolle", Some("keramikk"))).await;
    let _print = create_item(&app, &admin, &item("Trykk", Some("grafikk"))).await;

    let (status, body) = get(&app, "/api/gallery").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["total"], 3);

    let (status, body) = get(&app, "/api/gallery?category=keramikk").await;
    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert_eq!(json["total"], 2);
    let all_ceramics = json["items"]
        .as_array()
        .is_some_and(|items| items.iter().all(|i| i["category"] == "keramikk"));
    assert!(all_ceramics);
}

#[tokio::test]
async fn gallery_writes_require_admin() {
    let (app, _db) = test_app().await;
    let token = signup_and_signin(&app, "ola@example.no").await;

    let (status, _) = post_with_auth(&app, "/api/gallery", &token, &item("Vase", None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn gallery_rejects_invalid_items() {
    let (app, db) = test_app().await;
    let admin = admin_token(&app, &db).await;

    let mut bad_url = item("Vase", None);
    bad_url["imageUrl"] = json!("vase.jpg");
    let (status, _) = post_with_auth(&app, "/api/gallery", &admin, &bad_url).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let mut long_title = item("Vase", None);
    long_title["title"] = json!({ "no": "x".repeat(201), "en": "Vase" });
    let (status, _) = post_with_auth(&app, "/api/gallery", &admin, &long_title).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let mut bad_price = item("Vase", None);
    bad_price["price"] = json!("gratis");
    let (status, _) = post_with_auth(&app, "/api/gallery", &admin, &bad_price).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn gallery_item_can_be_updated_and_deleted() {
    let (app, db) = test_app().await;
    let admin = admin_token(&app, &db).await;
    let id = create_item(&app, &admin, &item("Vase", Some("keramikk"))).await;
    let uri = format!("/api/gallery/{id}");

    let (status, body) = patch_with_auth(
        &app,
        &uri,
        &admin,
        &json!({ "price": null, "imageUrl": "https://cdn.example.no/vase.webp" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert!(json["price"].is_null());
    assert_eq!(json["imageUrl"], "https://cdn.example.no/vase.webp");
    assert_eq!(json["category"], "keramikk");

    let (status, _) = delete_with_auth(&app, &uri, &admin).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = get(&app, "/api/gallery").await;
    assert_eq!(json_body(&body)["total"], 0);
}

#[tokio::test]
async fn updating_missing_item_is_not_found() {
    let (app, db) = test_app().await;
    let admin = admin_token(&app, &db).await;

    let (status, _) = patch_with_auth(
        &app,
        &format!("/api/gallery/{}", uuid::Uuid::new_v4()),
        &admin,
        &json!({ "price": "100" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
