mod helpers;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use helpers::{api_path, spawn_app, spawn_app_with_generator};
use inkpot_api::services::content::{GeneratedText, GenerationInput, TextGenerator};
use inkpot_core::AppError;
use serde_json::json;

struct CannedGenerator;

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, input: &GenerationInput) -> Result<GeneratedText, AppError> {
        Ok(GeneratedText {
            content: format!("canned {} about {}", input.content_type.as_str(), input.topic),
            tokens_used: 42,
        })
    }
}

#[tokio::test]
async fn generation_requires_a_configured_provider() {
    let app = spawn_app().await;
    let token = app.register("ai-less@example.com", "Ailess").await;
    let org_id = app.create_organization(&token, "No AI Co", "starter").await;

    let response = app
        .server
        .post(&api_path("/ai/generate"))
        .authorization_bearer(&token)
        .json(&json!({
            "organization_id": org_id,
            "content_type": "blog_post",
            "topic": "launch week",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generation_persists_and_shows_in_history() {
    let app = spawn_app_with_generator(Some(Arc::new(CannedGenerator))).await;
    let token = app.register("ai-user@example.com", "Ai User").await;
    let org_id = app.create_organization(&token, "AI Co", "starter").await;

    let response = app
        .server
        .post(&api_path("/ai/generate"))
        .authorization_bearer(&token)
        .json(&json!({
            "organization_id": org_id,
            "content_type": "social_media",
            "topic": "launch week",
            "tone": "excited",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["content_type"], "social_media");
    assert_eq!(body["output_content"], "canned social_media about launch week");
    assert_eq!(body["tokens_used"], 42);
    assert_eq!(body["input"]["tone"], "excited");

    let history = app
        .server
        .get(&api_path("/ai/history"))
        .authorization_bearer(&token)
        .await;
    history.assert_status_ok();
    let entries: Vec<serde_json::Value> = history.json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], body["id"]);
}

#[tokio::test]
async fn generation_is_member_gated() {
    let app = spawn_app_with_generator(Some(Arc::new(CannedGenerator))).await;
    let owner = app.register("ai-owner@example.com", "Owner").await;
    let outsider = app.register("ai-outsider@example.com", "Outsider").await;
    let org_id = app.create_organization(&owner, "Gated AI Co", "starter").await;

    let response = app
        .server
        .post(&api_path("/ai/generate"))
        .authorization_bearer(&outsider)
        .json(&json!({
            "organization_id": org_id,
            "content_type": "email",
            "topic": "anything",
        }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}
