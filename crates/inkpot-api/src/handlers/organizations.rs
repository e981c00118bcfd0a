//! Organization endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use inkpot_core::{models::Organization, AppError};
use inkpot_db::MemberInfo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::AuthContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::handlers::{member_role, require_capability};
use crate::middleware::audit::AuditLogEntry;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: String,
    /// Plan name; unknown plans fall back to the starter limits.
    pub plan: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrganizationResponse {
    #[serde(flatten)]
    pub organization: Organization,
    pub role: String,
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(request): ValidatedJson<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Organization>), HttpAppError> {
    let plan = request.plan.as_deref().unwrap_or("starter");
    let organization = state
        .organizations
        .create(&request.name, plan, &auth.user)
        .await?;

    AuditLogEntry::new("organization_created")
        .user_id(auth.user.id)
        .organization_id(organization.id)
        .outcome("success")
        .log();

    Ok((StatusCode::CREATED, Json(organization)))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<Organization>>, HttpAppError> {
    let organizations = state.organizations.list_for_user(auth.user.id).await?;
    Ok(Json(organizations))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(organization_id): Path<Uuid>,
) -> Result<Json<OrganizationResponse>, HttpAppError> {
    let role = member_role(&state, organization_id, auth.user.id).await?;
    let organization = state
        .organizations
        .find_by_id(organization_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    Ok(Json(OrganizationResponse {
        organization,
        role: role.as_str().to_string(),
    }))
}

pub async fn members(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(organization_id): Path<Uuid>,
) -> Result<Json<Vec<MemberInfo>>, HttpAppError> {
    member_role(&state, organization_id, auth.user.id).await?;
    let members = state.memberships.list_members(organization_id).await?;
    Ok(Json(members))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(organization_id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    require_capability(&state, organization_id, auth.user.id, |caps| {
        caps.can_delete_org
    })
    .await?;

    state
        .organizations
        .delete(organization_id, auth.user.id)
        .await?;

    AuditLogEntry::new("organization_deleted")
        .user_id(auth.user.id)
        .organization_id(organization_id)
        .outcome("success")
        .log();

    Ok(StatusCode::NO_CONTENT)
}
