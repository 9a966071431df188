mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{event_body, TestApp};

#[tokio::test]
async fn test_labels_are_listed_in_order() {
    let app = TestApp::new();
    app.create_label("/event-types", "Workshop").await;
    app.create_label("/event-types", "Concert").await;

    let (status, listed) = app.get("/event-types").await;
    assert_eq!(status, StatusCode::OK);

    let labels: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Concert", "Workshop"]);

    // The two vocabularies are independent.
    let (_, categories) = app.get("/event-categories").await;
    assert_eq!(categories, json!([]));
}

#[tokio::test]
async fn test_duplicate_label_conflicts() {
    let app = TestApp::new();
    app.create_label("/event-categories", "Music").await;

    let (status, error) = app
        .send(
            Method::POST,
            "/event-categories",
            Some(&app.admin_token()),
            Some(json!({ "label": "Music" })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_blank_label_is_rejected() {
    let app = TestApp::new();
    let (status, _) = app
        .send(
            Method::POST,
            "/event-types",
            Some(&app.admin_token()),
            Some(json!({ "label": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rename_and_get() {
    let app = TestApp::new();
    let id = app.create_label("/event-types", "Concrt").await;
    let uri = format!("/event-types/{}", id);

    let (status, renamed) = app
        .send(
            Method::PUT,
            &uri,
            Some(&app.admin_token()),
            Some(json!({ "label": "Concert" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed, json!({ "id": id, "label": "Concert" }));

    let (status, fetched) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, renamed);

    let (status, _) = app
        .get(&format!("/event-types/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_category_clears_event_reference() {
    let app = TestApp::new();
    let music = app.create_label("/event-categories", "Music").await;
    let mut body = event_body("Jazz Festival", "Paris", 2);
    body["categoryId"] = json!(music);
    let event = app.create_event(body).await;

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/event-categories/{}", music),
            Some(&app.admin_token()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, reloaded) = app
        .get(&format!("/events/{}", event["id"].as_str().unwrap()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(reloaded["categoryId"].is_null());
    assert!(reloaded["categoryLabel"].is_null());
}

#[tokio::test]
async fn test_catalog_writes_require_admin() {
    let app = TestApp::new();
    let (status, _) = app
        .send(
            Method::POST,
            "/event-types",
            Some(&app.user_token()),
            Some(json!({ "label": "Concert" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/event-types/{}", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
