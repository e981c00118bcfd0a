mod helpers;

use axum::http::StatusCode;
use helpers::{api_path, spawn_app};
use serde_json::json;

#[tokio::test]
async fn register_then_me_returns_current_user() {
    let app = spawn_app().await;
    let token = app.register("ada@example.com", "Ada").await;

    let response = app
        .server
        .get(&api_path("/auth/me"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["name"], "Ada");
    // The hash never leaves the server
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_email_registration_conflicts() {
    let app = spawn_app().await;
    app.register("dup@example.com", "First").await;

    let response = app
        .server
        .post(&api_path("/auth/register"))
        .json(&json!({
            "email": "DUP@example.com",
            "name": "Second",
            "password": "hunter2hunter2",
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<serde_json::Value>()["code"], "CONFLICT");
}

#[tokio::test]
async fn login_succeeds_with_correct_password() {
    let app = spawn_app().await;
    app.register("login@example.com", "Login").await;

    let response = app
        .server
        .post(&api_path("/auth/login"))
        .json(&json!({
            "email": "login@example.com",
            "password": "hunter2hunter2",
        }))
        .await;
    response.assert_status_ok();
    assert!(response.json::<serde_json::Value>()["token"].is_string());
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email() {
    let app = spawn_app().await;
    app.register("victim@example.com", "Victim").await;

    let wrong = app
        .server
        .post(&api_path("/auth/login"))
        .json(&json!({
            "email": "victim@example.com",
            "password": "not-the-password",
        }))
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);

    let unknown = app
        .server
        .post(&api_path("/auth/login"))
        .json(&json!({
            "email": "nobody@example.com",
            "password": "whatever-at-all",
        }))
        .await;
    unknown.assert_status(StatusCode::UNAUTHORIZED);

    // Same error either way: no account enumeration
    assert_eq!(
        wrong.json::<serde_json::Value>()["error"],
        unknown.json::<serde_json::Value>()["error"]
    );
}

#[tokio::test]
async fn invalid_registration_payload_is_rejected() {
    let app = spawn_app().await;

    let bad_email = app
        .server
        .post(&api_path("/auth/register"))
        .json(&json!({
            "email": "not-an-email",
            "name": "X",
            "password": "hunter2hunter2",
        }))
        .await;
    bad_email.assert_status(StatusCode::BAD_REQUEST);

    let short_password = app
        .server
        .post(&api_path("/auth/register"))
        .json(&json!({
            "email": "ok@example.com",
            "name": "X",
            "password": "short",
        }))
        .await;
    short_password.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = spawn_app().await;

    let no_token = app.server.get(&api_path("/auth/me")).await;
    no_token.assert_status(StatusCode::UNAUTHORIZED);

    let bad_token = app
        .server
        .get(&api_path("/auth/me"))
        .authorization_bearer("not-a-jwt")
        .await;
    bad_token.assert_status(StatusCode::UNAUTHORIZED);
}
