mod helpers;

use axum::http::StatusCode;
use helpers::{api_path, spawn_app};
use serde_json::json;
use uuid::Uuid;

async fn create_project(
    app: &helpers::TestApp,
    token: &str,
    org_id: Uuid,
    name: &str,
) -> axum_test::TestResponse {
    app.server
        .post(&api_path(&format!("/organizations/{org_id}/projects")))
        .authorization_bearer(token)
        .json(&json!({ "name": name }))
        .await
}

#[tokio::test]
async fn create_project_increments_active_count() {
    let app = spawn_app().await;
    let token = app.register("builder@example.com", "Builder").await;
    let org_id = app.create_organization(&token, "Build Co", "pro").await;

    let response = create_project(&app, &token, org_id, "First Project").await;
    response.assert_status(StatusCode::CREATED);

    assert_eq!(app.active_projects(org_id).await, 1);
    assert_eq!(app.activity_count(org_id, "project_created").await, 1);
}

#[tokio::test]
async fn starter_plan_is_capped_at_one_project() {
    let app = spawn_app().await;
    let token = app.register("starter@example.com", "Starter").await;
    let org_id = app.create_organization(&token, "Tiny Co", "starter").await;

    create_project(&app, &token, org_id, "Only Project")
        .await
        .assert_status(StatusCode::CREATED);

    let over = create_project(&app, &token, org_id, "One Too Many").await;
    over.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = over.json();
    assert_eq!(body["code"], "QUOTA_EXCEEDED");

    assert_eq!(app.active_projects(org_id).await, 1);
}

#[tokio::test]
async fn deleting_a_project_frees_its_quota_slot() {
    let app = spawn_app().await;
    let token = app.register("recycler@example.com", "Recycler").await;
    let org_id = app.create_organization(&token, "Recycle Co", "starter").await;

    let created = create_project(&app, &token, org_id, "Disposable").await;
    created.assert_status(StatusCode::CREATED);
    let project_id = created.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();

    app.server
        .delete(&api_path(&format!(
            "/organizations/{org_id}/projects/{project_id}"
        )))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_eq!(app.active_projects(org_id).await, 0);

    // The freed slot is usable again
    create_project(&app, &token, org_id, "Replacement")
        .await
        .assert_status(StatusCode::CREATED);
    assert_eq!(app.active_projects(org_id).await, 1);

    // Deleting the first project again is a 404 and does not touch the counter
    let again = app
        .server
        .delete(&api_path(&format!(
            "/organizations/{org_id}/projects/{project_id}"
        )))
        .authorization_bearer(&token)
        .await;
    again.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(app.active_projects(org_id).await, 1);
}

#[tokio::test]
async fn concurrent_creates_never_exceed_the_plan_limit() {
    let app = spawn_app().await;
    let token = app.register("swarm@example.com", "Swarm").await;
    let org_id = app.create_organization(&token, "Swarm Co", "pro").await;

    let attempts = 8usize;
    let names: Vec<String> = (0..attempts).map(|i| format!("Concurrent {i}")).collect();
    let futures: Vec<_> = names
        .iter()
        .map(|name| create_project(&app, &token, org_id, name))
        .collect();
    let responses = futures::future::join_all(futures).await;

    let created = responses
        .iter()
        .filter(|r| r.status_code() == StatusCode::CREATED)
        .count();
    let rejected = responses
        .iter()
        .filter(|r| r.status_code() == StatusCode::PAYMENT_REQUIRED)
        .count();

    assert_eq!(created, 5, "pro plan allows exactly 5 projects");
    assert_eq!(rejected, attempts - 5);
    assert_eq!(app.active_projects(org_id).await, 5);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE organization_id = $1")
        .bind(org_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(rows, 5);
}

#[tokio::test]
async fn project_access_is_member_gated_uniformly() {
    let app = spawn_app().await;
    let owner = app.register("proj-owner@example.com", "Owner").await;
    let outsider = app.register("proj-outsider@example.com", "Outsider").await;
    let org_id = app.create_organization(&owner, "Members Only Co", "starter").await;

    let created = create_project(&app, &owner, org_id, "Secret Project").await;
    let project_id = created.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let get = app
        .server
        .get(&api_path(&format!(
            "/organizations/{org_id}/projects/{project_id}"
        )))
        .authorization_bearer(&outsider)
        .await;
    get.assert_status(StatusCode::FORBIDDEN);

    let update = app
        .server
        .patch(&api_path(&format!(
            "/organizations/{org_id}/projects/{project_id}"
        )))
        .authorization_bearer(&outsider)
        .json(&json!({ "name": "Hijacked" }))
        .await;
    update.assert_status(StatusCode::FORBIDDEN);

    let delete = app
        .server
        .delete(&api_path(&format!(
            "/organizations/{org_id}/projects/{project_id}"
        )))
        .authorization_bearer(&outsider)
        .await;
    delete.assert_status(StatusCode::FORBIDDEN);

    // A nonexistent project under a foreign org answers identically
    let ghost = app
        .server
        .get(&api_path(&format!(
            "/organizations/{org_id}/projects/{}",
            Uuid::new_v4()
        )))
        .authorization_bearer(&outsider)
        .await;
    ghost.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn update_changes_name_and_clears_description() {
    let app = spawn_app().await;
    let token = app.register("editor@example.com", "Editor").await;
    let org_id = app.create_organization(&token, "Edit Co", "starter").await;

    let created = app
        .server
        .post(&api_path(&format!("/organizations/{org_id}/projects")))
        .authorization_bearer(&token)
        .json(&json!({ "name": "Draft", "description": "work in progress" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let project_id = created.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let renamed = app
        .server
        .patch(&api_path(&format!(
            "/organizations/{org_id}/projects/{project_id}"
        )))
        .authorization_bearer(&token)
        .json(&json!({ "name": "Final" }))
        .await;
    renamed.assert_status_ok();
    let body: serde_json::Value = renamed.json();
    assert_eq!(body["name"], "Final");
    assert_eq!(body["description"], "work in progress");

    let cleared = app
        .server
        .patch(&api_path(&format!(
            "/organizations/{org_id}/projects/{project_id}"
        )))
        .authorization_bearer(&token)
        .json(&json!({ "description": null }))
        .await;
    cleared.assert_status_ok();
    assert!(cleared.json::<serde_json::Value>()["description"].is_null());
}

#[tokio::test]
async fn organization_activity_feed_lists_project_events() {
    let app = spawn_app().await;
    let token = app.register("historian@example.com", "Historian").await;
    let org_id = app.create_organization(&token, "History Co", "pro").await;

    create_project(&app, &token, org_id, "Tracked")
        .await
        .assert_status(StatusCode::CREATED);

    let feed = app
        .server
        .get(&api_path(&format!(
            "/organizations/{org_id}/activity?action=project_created"
        )))
        .authorization_bearer(&token)
        .await;
    feed.assert_status_ok();
    let entries: Vec<serde_json::Value> = feed.json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "project_created");
}
