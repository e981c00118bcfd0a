use inkpot_core::{models::Project, quota, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::activity::{ActivityRepository, NewActivity};
use super::organization::OrganizationRepository;

const PROJECT_COLUMNS: &str =
    "id, organization_id, name, description, created_by_id, created_at, updated_at";

/// Repository for projects.
///
/// Create and delete both run under a lock on the owning organization row:
/// the quota check, the insert, and the counter update are one atomic step,
/// so `active_projects` can never pass the plan limit under concurrency.
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
    organizations: OrganizationRepository,
    activity: ActivityRepository,
}

impl ProjectRepository {
    pub fn new(
        pool: PgPool,
        organizations: OrganizationRepository,
        activity: ActivityRepository,
    ) -> Self {
        Self {
            pool,
            organizations,
            activity,
        }
    }

    #[tracing::instrument(skip(self, description), fields(db.table = "projects", db.operation = "insert", org.id = %organization_id))]
    pub async fn create(
        &self,
        organization_id: Uuid,
        name: &str,
        description: Option<&str>,
        created_by: Uuid,
    ) -> Result<Project, AppError> {
        let mut tx = self.pool.begin().await?;

        let organization = self
            .organizations
            .find_for_update(&mut tx, organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

        if !quota::allow_create_project(&organization.plan_name, organization.active_projects) {
            return Err(AppError::QuotaExceeded {
                resource: "projects".to_string(),
                used: organization.active_projects as i64,
                limit: inkpot_core::Plan::from_name(&organization.plan_name).max_projects() as i64,
            });
        }

        let project = sqlx::query_as::<Postgres, Project>(&format!(
            r#"
            INSERT INTO projects (organization_id, name, description, created_by_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(organization_id)
        .bind(name)
        .bind(description)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE organizations SET active_projects = active_projects + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(organization_id)
        .execute(&mut *tx)
        .await?;

        self.activity
            .record(
                &mut tx,
                NewActivity::new("project_created", format!("Project '{}' created", name))
                    .user(created_by)
                    .organization(organization_id)
                    .project(project.id),
            )
            .await?;

        tx.commit().await?;

        Ok(project)
    }

    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "select", db.record_id = %id))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "select", org.id = %organization_id))]
    pub async fn list_for_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<Postgres, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE organization_id = $1 ORDER BY created_at DESC",
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    /// Update name and/or description. The organization id never moves.
    #[tracing::instrument(skip(self, name, description), fields(db.table = "projects", db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        name: Option<&str>,
        description: Option<Option<&str>>,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(&format!(
            r#"
            UPDATE projects
            SET name = COALESCE($3, name),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(organization_id)
        .bind(name)
        .bind(description.is_some())
        .bind(description.flatten())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        Ok(project)
    }

    /// Delete a project and release its quota slot. A repeat delete of the
    /// same id fails with NotFound and leaves the counter alone.
    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
        deleted_by: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock ordering matches create: organization first, then the row.
        let organization = self
            .organizations
            .find_for_update(&mut tx, organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

        let name: Option<String> = sqlx::query_scalar(
            "DELETE FROM projects WHERE id = $1 AND organization_id = $2 RETURNING name",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(name) = name else {
            return Err(AppError::NotFound("Project not found".to_string()));
        };

        sqlx::query(
            "UPDATE organizations SET active_projects = GREATEST(active_projects - 1, 0), updated_at = NOW() WHERE id = $1",
        )
        .bind(organization.id)
        .execute(&mut *tx)
        .await?;

        self.activity
            .record(
                &mut tx,
                NewActivity::new("project_deleted", format!("Project '{}' deleted", name))
                    .user(deleted_by)
                    .organization(organization_id)
                    .project(id),
            )
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
