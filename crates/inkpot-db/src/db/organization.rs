use inkpot_core::{
    models::{Organization, User},
    AppError, Plan, Role,
};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::activity::{ActivityRepository, NewActivity};

const ORG_COLUMNS: &str =
    "id, name, plan_name, max_projects, active_projects, created_by_id, created_at, updated_at";

/// Repository for organizations.
///
/// Creation is a single transaction: name check, creator quota check,
/// organization insert, admin membership insert, activity row. Either all of
/// it lands or none of it does.
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
    activity: ActivityRepository,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool, activity: ActivityRepository) -> Self {
        Self { pool, activity }
    }

    #[tracing::instrument(skip(self, creator), fields(db.table = "organizations", db.operation = "insert", user.id = %creator.id))]
    pub async fn create(
        &self,
        name: &str,
        plan_name: &str,
        creator: &User,
    ) -> Result<Organization, AppError> {
        if !creator.is_active {
            return Err(AppError::PermissionDenied(
                "Inactive accounts cannot create organizations".to_string(),
            ));
        }

        let plan = Plan::from_name(plan_name);
        let mut tx = self.pool.begin().await?;

        let name_taken = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM organizations WHERE LOWER(name) = LOWER($1))",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        if name_taken {
            return Err(AppError::Conflict(format!(
                "Organization name '{}' is already taken",
                name
            )));
        }

        // Serialize creates per user; the quota count reads through this lock
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(creator.id)
            .execute(&mut *tx)
            .await?;

        let created_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM organizations WHERE created_by_id = $1")
                .bind(creator.id)
                .fetch_one(&mut *tx)
                .await?;

        if created_count >= creator.max_organizations as i64 {
            return Err(AppError::QuotaExceeded {
                resource: "organizations".to_string(),
                used: created_count,
                limit: creator.max_organizations as i64,
            });
        }

        let organization = sqlx::query_as::<Postgres, Organization>(&format!(
            r#"
            INSERT INTO organizations (name, plan_name, max_projects, created_by_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {ORG_COLUMNS}
            "#,
        ))
        .bind(name)
        .bind(plan.as_str())
        .bind(plan.max_projects())
        .bind(creator.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match err {
            // Unique index race: two creates with the same name passed EXISTS
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                format!("Organization name '{}' is already taken", name),
            ),
            other => AppError::Database(other),
        })?;

        sqlx::query(
            r#"
            INSERT INTO organization_members (organization_id, user_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(organization.id)
        .bind(creator.id)
        .bind(Role::Admin)
        .execute(&mut *tx)
        .await?;

        self.activity
            .record(
                &mut tx,
                NewActivity::new(
                    "org_created",
                    format!("Organization '{}' created", organization.name),
                )
                .user(creator.id)
                .organization(organization.id)
                .metadata(serde_json::json!({ "plan": plan.as_str() })),
            )
            .await?;

        tx.commit().await?;

        Ok(organization)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select", db.record_id = %id))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let organization = sqlx::query_as::<Postgres, Organization>(&format!(
            "SELECT {ORG_COLUMNS} FROM organizations WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }

    /// Lock the organization row for the rest of the transaction.
    /// The project quota check-and-increment reads through this.
    pub async fn find_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Organization>, AppError> {
        let organization = sqlx::query_as::<Postgres, Organization>(&format!(
            "SELECT {ORG_COLUMNS} FROM organizations WHERE id = $1 FOR UPDATE",
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(organization)
    }

    /// Organizations the user belongs to, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select", user.id = %user_id))]
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Organization>, AppError> {
        let organizations = sqlx::query_as::<Postgres, Organization>(
            r#"
            SELECT o.id, o.name, o.plan_name, o.max_projects, o.active_projects,
                   o.created_by_id, o.created_at, o.updated_at
            FROM organizations o
            INNER JOIN organization_members m ON m.organization_id = o.id
            WHERE m.user_id = $1
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(organizations)
    }

    /// Delete an organization (owner only, checked by the caller). Members,
    /// invitations, and projects cascade; activity rows stay.
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid, deleted_by: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let name: Option<String> =
            sqlx::query_scalar("DELETE FROM organizations WHERE id = $1 RETURNING name")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(name) = name else {
            return Err(AppError::NotFound("Organization not found".to_string()));
        };

        self.activity
            .record(
                &mut tx,
                NewActivity::new("org_deleted", format!("Organization '{}' deleted", name))
                    .user(deleted_by)
                    .organization(id),
            )
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
