mod helpers;

use axum::http::StatusCode;
use helpers::{api_path, spawn_app};
use serde_json::json;

#[tokio::test]
async fn post_crud_round_trip() {
    let app = spawn_app().await;
    let token = app.register("writer@example.com", "Writer").await;

    let created = app
        .server
        .post(&api_path("/posts"))
        .authorization_bearer(&token)
        .json(&json!({ "title": "Hello", "content": "First post." }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let post_id = created.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let updated = app
        .server
        .patch(&api_path(&format!("/posts/{post_id}")))
        .authorization_bearer(&token)
        .json(&json!({ "content": "First post, revised." }))
        .await;
    updated.assert_status_ok();
    let body: serde_json::Value = updated.json();
    assert_eq!(body["title"], "Hello");
    assert_eq!(body["content"], "First post, revised.");

    let listed = app
        .server
        .get(&api_path("/posts"))
        .authorization_bearer(&token)
        .await;
    listed.assert_status_ok();
    assert_eq!(listed.json::<Vec<serde_json::Value>>().len(), 1);

    app.server
        .delete(&api_path(&format!("/posts/{post_id}")))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let gone = app
        .server
        .get(&api_path(&format!("/posts/{post_id}")))
        .authorization_bearer(&token)
        .await;
    gone.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn foreign_posts_are_forbidden() {
    let app = spawn_app().await;
    let author = app.register("author@example.com", "Author").await;
    let reader = app.register("reader@example.com", "Reader").await;

    let created = app
        .server
        .post(&api_path("/posts"))
        .authorization_bearer(&author)
        .json(&json!({ "title": "Mine", "content": "Private draft." }))
        .await;
    let post_id = created.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let get = app
        .server
        .get(&api_path(&format!("/posts/{post_id}")))
        .authorization_bearer(&reader)
        .await;
    get.assert_status(StatusCode::FORBIDDEN);

    let update = app
        .server
        .patch(&api_path(&format!("/posts/{post_id}")))
        .authorization_bearer(&reader)
        .json(&json!({ "title": "Stolen" }))
        .await;
    update.assert_status(StatusCode::FORBIDDEN);

    let delete = app
        .server
        .delete(&api_path(&format!("/posts/{post_id}")))
        .authorization_bearer(&reader)
        .await;
    delete.assert_status(StatusCode::FORBIDDEN);

    // Listings only show the caller's own posts
    let listed = app
        .server
        .get(&api_path("/posts"))
        .authorization_bearer(&reader)
        .await;
    assert!(listed.json::<Vec<serde_json::Value>>().is_empty());
}
