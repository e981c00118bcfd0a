//! Registration, login, and the current-user endpoint

use axum::{extract::State, http::StatusCode, Json};
use inkpot_core::{models::User, AppError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::models::{AuthContext, ClientIp};
use crate::auth::{jwt, password};
use crate::error::{HttpAppError, ValidatedJson};
use crate::middleware::audit::AuditLogEntry;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: String,
    #[validate(length(min = 8, max = 128, message = "must be 8-128 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), HttpAppError> {
    let password_hash = password::hash_password(&request.password)?;
    let user = state
        .users
        .create(&request.email, &request.name, &password_hash)
        .await?;

    let token = jwt::issue_token(
        state.config.jwt_secret(),
        user.id,
        &user.email,
        state.config.jwt_expiry_hours(),
    )?;

    AuditLogEntry::new("user_registered")
        .user_id(user.id)
        .outcome("success")
        .log();

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, HttpAppError> {
    if !state.auth_failures.check(client_ip).await {
        AuditLogEntry::new("login_throttled")
            .client_ip(client_ip)
            .outcome("denied")
            .log();
        return Err(HttpAppError(AppError::Unauthorized(
            "Too many failed login attempts, try again later".to_string(),
        )));
    }

    let user = state.users.find_by_email(&request.email).await?;

    // Verify against a stored hash even when the account does not exist, so
    // the timing of the response does not reveal which emails are registered.
    let verified = match &user {
        Some(user) => password::verify_password(&request.password, &user.password_hash),
        None => {
            let _ = password::hash_password(&request.password);
            false
        }
    };

    let Some(user) = user.filter(|_| verified) else {
        state.auth_failures.record_failure(client_ip).await;
        AuditLogEntry::new("login_failed")
            .client_ip(client_ip)
            .outcome("invalid_credentials")
            .log();
        return Err(HttpAppError(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        )));
    };

    if !user.is_active {
        AuditLogEntry::new("login_failed")
            .user_id(user.id)
            .client_ip(client_ip)
            .outcome("inactive_account")
            .log();
        return Err(HttpAppError(AppError::Unauthorized(
            "Account is deactivated".to_string(),
        )));
    }

    state.auth_failures.record_success(client_ip).await;

    let token = jwt::issue_token(
        state.config.jwt_secret(),
        user.id,
        &user.email,
        state.config.jwt_expiry_hours(),
    )?;

    AuditLogEntry::new("login_succeeded")
        .user_id(user.id)
        .client_ip(client_ip)
        .outcome("success")
        .log();

    Ok(Json(AuthResponse { token, user }))
}

pub async fn me(auth: AuthContext) -> Json<User> {
    Json(auth.user)
}
