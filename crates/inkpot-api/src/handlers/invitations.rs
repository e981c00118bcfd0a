//! Invitation endpoints
//!
//! Issue and cancel live under the organization; accept and decline are
//! addressed by token, since the invitee may not be a member of anything yet.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use inkpot_core::{
    models::{Invitation, Membership},
    Role,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::AuthContext;
use crate::auth::token::generate_invitation_token;
use crate::error::{HttpAppError, ValidatedJson};
use crate::handlers::require_capability;
use crate::middleware::audit::AuditLogEntry;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InviteRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub role: Role,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub message: Option<String>,
}

pub async fn invite(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(organization_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<InviteRequest>,
) -> Result<(StatusCode, Json<Invitation>), HttpAppError> {
    require_capability(&state, organization_id, auth.user.id, |caps| {
        caps.can_invite
    })
    .await?;

    let token = generate_invitation_token();
    let invitation = state
        .invitations
        .create(
            organization_id,
            &request.email,
            request.role,
            &token,
            request.message.as_deref(),
            auth.user.id,
            state.config.invitation_expiry_days(),
        )
        .await?;

    AuditLogEntry::new("invitation_issued")
        .user_id(auth.user.id)
        .organization_id(organization_id)
        .outcome("success")
        .log();

    // Email goes out after the row is committed; delivery failure never
    // unwinds the invitation.
    if let Some(email) = &state.email {
        let organization_name = state
            .organizations
            .find_by_id(organization_id)
            .await?
            .map(|org| org.name)
            .unwrap_or_else(|| "an organization".to_string());
        email.send_invitation(&request.email, &organization_name, &auth.user.name, &token);
    }

    Ok((StatusCode::CREATED, Json(invitation)))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(organization_id): Path<Uuid>,
) -> Result<Json<Vec<Invitation>>, HttpAppError> {
    require_capability(&state, organization_id, auth.user.id, |caps| {
        caps.can_invite
    })
    .await?;

    let invitations = state
        .invitations
        .list_for_organization(organization_id)
        .await?;
    Ok(Json(invitations))
}

pub async fn accept(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(token): Path<String>,
) -> Result<Json<Membership>, HttpAppError> {
    let membership = state.invitations.accept(&token, &auth.user).await?;

    AuditLogEntry::new("invitation_accepted")
        .user_id(auth.user.id)
        .organization_id(membership.organization_id)
        .outcome("success")
        .log();

    Ok(Json(membership))
}

pub async fn decline(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(token): Path<String>,
) -> Result<Json<Invitation>, HttpAppError> {
    let invitation = state.invitations.decline(&token, &auth.user).await?;
    Ok(Json(invitation))
}

pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((organization_id, invitation_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Invitation>, HttpAppError> {
    require_capability(&state, organization_id, auth.user.id, |caps| {
        caps.can_cancel_invitations
    })
    .await?;

    let invitation = state
        .invitations
        .cancel(organization_id, invitation_id, auth.user.id)
        .await?;
    Ok(Json(invitation))
}
