//! Activity log endpoints
//!
//! Read-only: the log is append-only and rows are written by the repositories
//! inside the transactions they describe.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use inkpot_core::models::ActivityLog;
use inkpot_db::ActivityFilter;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::models::AuthContext;
use crate::error::HttpAppError;
use crate::handlers::member_role;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub action: Option<String>,
    pub user_id: Option<Uuid>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Activity for one organization, member-gated.
pub async fn list_for_organization(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(organization_id): Path<Uuid>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityLog>>, HttpAppError> {
    member_role(&state, organization_id, auth.user.id).await?;

    let filter = ActivityFilter {
        organization_id: Some(organization_id),
        user_id: query.user_id,
        action: query.action,
        since: query.since,
    };
    let logs = state
        .activity
        .list(filter, query.limit.unwrap_or(50), query.offset.unwrap_or(0))
        .await?;
    Ok(Json(logs))
}
