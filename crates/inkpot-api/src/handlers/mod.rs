pub mod activity;
pub mod ai_content;
pub mod auth;
pub mod invitations;
pub mod organizations;
pub mod posts;
pub mod projects;

use inkpot_core::{AppError, Capabilities, Role};
use uuid::Uuid;

use crate::state::AppState;

/// Resolve the caller's role in an organization, failing uniformly with
/// PermissionDenied for non-members. Membership is never disclosed through a
/// different status code, so outsiders cannot probe which organizations exist.
pub(crate) async fn member_role(
    state: &AppState,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<Role, AppError> {
    state
        .memberships
        .role_of(organization_id, user_id)
        .await?
        .ok_or_else(|| {
            AppError::PermissionDenied(
                "You do not have access to this organization".to_string(),
            )
        })
}

/// Like [`member_role`], but also checks one capability off the role.
pub(crate) async fn require_capability(
    state: &AppState,
    organization_id: Uuid,
    user_id: Uuid,
    check: fn(&Capabilities) -> bool,
) -> Result<Role, AppError> {
    let role = member_role(state, organization_id, user_id).await?;
    if !check(&role.capabilities()) {
        return Err(AppError::PermissionDenied(
            "Your role does not allow this action".to_string(),
        ));
    }
    Ok(role)
}
