use chrono::{DateTime, Utc};
use inkpot_core::{models::ActivityLog, AppError};
use sqlx::{PgConnection, PgPool, Postgres};
use uuid::Uuid;

/// One activity row about to be written.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub action: String,
    pub description: String,
    pub user_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub metadata: serde_json::Value,
}

impl NewActivity {
    pub fn new(action: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            description: description.into(),
            user_id: None,
            organization_id: None,
            project_id: None,
            metadata: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn organization(mut self, organization_id: Uuid) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    pub fn project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Filters for listing activity.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub organization_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub action: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

/// Repository for the append-only activity log.
///
/// `record` takes an open connection so the row commits or rolls back with
/// the operation it describes. There is no update or delete: the table is
/// the compliance trail.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one activity row on the caller's connection (usually a
    /// transaction). Failures propagate: the enclosing operation must not
    /// succeed without its audit row.
    #[tracing::instrument(skip(self, conn, entry), fields(db.table = "activity_logs", db.operation = "insert", activity.action = %entry.action))]
    pub async fn record(&self, conn: &mut PgConnection, entry: NewActivity) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (action, description, user_id, organization_id, project_id, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&entry.action)
        .bind(&entry.description)
        .bind(entry.user_id)
        .bind(entry.organization_id)
        .bind(entry.project_id)
        .bind(&entry.metadata)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// List activity, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "activity_logs", db.operation = "select"))]
    pub async fn list(
        &self,
        filter: ActivityFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLog>, AppError> {
        let logs = sqlx::query_as::<Postgres, ActivityLog>(
            r#"
            SELECT id, action, description, user_id, organization_id, project_id, metadata, created_at
            FROM activity_logs
            WHERE ($1::uuid IS NULL OR organization_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::varchar IS NULL OR action = $3)
              AND ($4::timestamptz IS NULL OR created_at >= $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.organization_id)
        .bind(filter.user_id)
        .bind(filter.action)
        .bind(filter.since)
        .bind(limit.clamp(1, 200))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
