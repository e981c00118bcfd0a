use chrono::{DateTime, Utc};
use inkpot_core::{AppError, Role};
use serde::Serialize;
use sqlx::{PgPool, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

/// Member listing row: membership joined with the user it belongs to.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct MemberInfo {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

/// Repository for organization memberships
#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The caller's role in an organization, or None for non-members.
    #[tracing::instrument(skip(self), fields(db.table = "organization_members", db.operation = "select"))]
    pub async fn role_of(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_scalar::<Postgres, Role>(
            "SELECT role FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    pub async fn is_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        Ok(self.role_of(organization_id, user_id).await?.is_some())
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_members", db.operation = "select", org.id = %organization_id))]
    pub async fn list_members(&self, organization_id: Uuid) -> Result<Vec<MemberInfo>, AppError> {
        let members = sqlx::query_as::<Postgres, MemberInfo>(
            r#"
            SELECT m.user_id, u.email, u.name, m.role, m.joined_at
            FROM organization_members m
            INNER JOIN users u ON u.id = m.user_id
            WHERE m.organization_id = $1
            ORDER BY m.joined_at ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
