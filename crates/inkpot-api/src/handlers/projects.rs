//! Project endpoints
//!
//! All routes are scoped under the owning organization. Non-members get a
//! uniform 403 whether or not the organization or project exists.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use inkpot_core::{models::Project, AppError};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::AuthContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::handlers::{member_role, require_capability};
use crate::middleware::audit::AuditLogEntry;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: Option<String>,
    /// Present-and-null clears the description; absent leaves it unchanged.
    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    pub description: Option<Option<String>>,
}

fn deserialize_explicit_null<'de, D>(
    deserializer: D,
) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::<String>::deserialize(deserializer)?))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(organization_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), HttpAppError> {
    require_capability(&state, organization_id, auth.user.id, |caps| {
        caps.can_manage_projects
    })
    .await?;

    let project = state
        .projects
        .create(
            organization_id,
            &request.name,
            request.description.as_deref(),
            auth.user.id,
        )
        .await?;

    AuditLogEntry::new("project_created")
        .user_id(auth.user.id)
        .organization_id(organization_id)
        .outcome("success")
        .log();

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(organization_id): Path<Uuid>,
) -> Result<Json<Vec<Project>>, HttpAppError> {
    member_role(&state, organization_id, auth.user.id).await?;
    let projects = state.projects.list_for_organization(organization_id).await?;
    Ok(Json(projects))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((organization_id, project_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Project>, HttpAppError> {
    member_role(&state, organization_id, auth.user.id).await?;

    let project = state
        .projects
        .find_by_id(project_id)
        .await?
        .filter(|p| p.organization_id == organization_id)
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((organization_id, project_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(request): ValidatedJson<UpdateProjectRequest>,
) -> Result<Json<Project>, HttpAppError> {
    require_capability(&state, organization_id, auth.user.id, |caps| {
        caps.can_manage_projects
    })
    .await?;

    let project = state
        .projects
        .update(
            organization_id,
            project_id,
            request.name.as_deref(),
            request.description.as_ref().map(|d| d.as_deref()),
        )
        .await?;

    Ok(Json(project))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((organization_id, project_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, HttpAppError> {
    require_capability(&state, organization_id, auth.user.id, |caps| {
        caps.can_manage_projects
    })
    .await?;

    state
        .projects
        .delete(organization_id, project_id, auth.user.id)
        .await?;

    AuditLogEntry::new("project_deleted")
        .user_id(auth.user.id)
        .organization_id(organization_id)
        .outcome("success")
        .log();

    Ok(StatusCode::NO_CONTENT)
}
