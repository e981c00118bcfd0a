mod helpers;

use axum::http::StatusCode;
use helpers::{api_path, spawn_app_with_rate_limit};

#[tokio::test]
async fn requests_over_the_limit_are_rejected_with_retry_after() {
    let app = spawn_app_with_rate_limit(3).await;
    let token = app.register("busy@example.com", "Busy").await;

    for expected_remaining in ["2", "1", "0"] {
        let response = app
            .server
            .get(&api_path("/auth/me"))
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.headers().get("x-ratelimit-remaining").unwrap(),
            expected_remaining
        );
        assert_eq!(response.headers().get("x-ratelimit-limit").unwrap(), "3");
    }

    let rejected = app
        .server
        .get(&api_path("/auth/me"))
        .authorization_bearer(&token)
        .await;
    rejected.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(rejected.json::<serde_json::Value>()["code"], "RATE_LIMITED");

    let retry_after: u64 = rejected
        .headers()
        .get("retry-after")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(rejected.headers().get("x-ratelimit-remaining").unwrap(), "0");
}

#[tokio::test]
async fn limits_are_tracked_per_user() {
    let app = spawn_app_with_rate_limit(2).await;
    let first = app.register("first@example.com", "First").await;
    let second = app.register("second@example.com", "Second").await;

    for _ in 0..2 {
        app.server
            .get(&api_path("/auth/me"))
            .authorization_bearer(&first)
            .await
            .assert_status_ok();
    }
    app.server
        .get(&api_path("/auth/me"))
        .authorization_bearer(&first)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    // A different user still has a full budget
    app.server
        .get(&api_path("/auth/me"))
        .authorization_bearer(&second)
        .await
        .assert_status_ok();
}
