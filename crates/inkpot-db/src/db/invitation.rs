use chrono::{Duration, Utc};
use inkpot_core::{
    models::{Invitation, InvitationStatus, Membership, User},
    AppError, Role,
};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::activity::{ActivityRepository, NewActivity};

const INVITATION_COLUMNS: &str = "id, organization_id, email, role, token, status, message, \
     invited_by_id, expires_at, created_at, responded_at";

/// Repository for organization invitations.
///
/// Every state transition locks the invitation row, so concurrent accepts
/// (or accept racing cancel) serialize: the first transition wins and the
/// rest see a non-pending row.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
    activity: ActivityRepository,
}

impl InvitationRepository {
    pub fn new(pool: PgPool, activity: ActivityRepository) -> Self {
        Self { pool, activity }
    }

    /// Issue an invitation. The token is generated by the caller and stored
    /// verbatim; at most one pending invitation may exist per address per
    /// organization (a partial unique index backs this under races).
    #[tracing::instrument(skip(self, token), fields(db.table = "organization_invitations", db.operation = "insert", org.id = %organization_id))]
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        organization_id: Uuid,
        email: &str,
        role: Role,
        token: &str,
        message: Option<&str>,
        invited_by: Uuid,
        expiry_days: i64,
    ) -> Result<Invitation, AppError> {
        let mut tx = self.pool.begin().await?;

        let already_member = sqlx::query_scalar::<Postgres, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM organization_members m
                INNER JOIN users u ON u.id = m.user_id
                WHERE m.organization_id = $1 AND LOWER(u.email) = LOWER($2)
            )
            "#,
        )
        .bind(organization_id)
        .bind(email)
        .fetch_one(&mut *tx)
        .await?;

        if already_member {
            return Err(AppError::Conflict(
                "This user is already a member of the organization".to_string(),
            ));
        }

        let pending_exists = sqlx::query_scalar::<Postgres, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM organization_invitations
                WHERE organization_id = $1 AND LOWER(email) = LOWER($2) AND status = 'pending'
            )
            "#,
        )
        .bind(organization_id)
        .bind(email)
        .fetch_one(&mut *tx)
        .await?;

        if pending_exists {
            return Err(AppError::Conflict(
                "A pending invitation already exists for this email".to_string(),
            ));
        }

        let expires_at = Utc::now() + Duration::days(expiry_days);

        let invitation = sqlx::query_as::<Postgres, Invitation>(&format!(
            r#"
            INSERT INTO organization_invitations
                (organization_id, email, role, token, message, invited_by_id, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {INVITATION_COLUMNS}
            "#,
        ))
        .bind(organization_id)
        .bind(email)
        .bind(role)
        .bind(token)
        .bind(message)
        .bind(invited_by)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                "A pending invitation already exists for this email".to_string(),
            ),
            other => AppError::Database(other),
        })?;

        self.activity
            .record(
                &mut tx,
                NewActivity::new(
                    "org_invite_sent",
                    format!("Invitation sent to {}", invitation.email),
                )
                .user(invited_by)
                .organization(organization_id)
                .metadata(serde_json::json!({ "role": role.as_str() })),
            )
            .await?;

        tx.commit().await?;

        Ok(invitation)
    }

    /// Accept an invitation on behalf of `user`. The invitation must be
    /// pending, unexpired, and addressed to the caller's email.
    #[tracing::instrument(skip(self, token, user), fields(db.table = "organization_invitations", db.operation = "update", user.id = %user.id))]
    pub async fn accept(&self, token: &str, user: &User) -> Result<Membership, AppError> {
        let mut tx = self.pool.begin().await?;

        let invitation = self.lock_by_token(&mut tx, token).await?;
        Self::guard_pending(&invitation)?;
        if invitation.is_expired_at(Utc::now()) {
            // Lazy expiry: persist the terminal state, then fail the call.
            self.transition(&mut tx, invitation.id, InvitationStatus::Expired)
                .await?;
            tx.commit().await?;
            return Err(AppError::InvitationExpired(
                "Invitation has expired".to_string(),
            ));
        }

        if !invitation.email.eq_ignore_ascii_case(&user.email) {
            return Err(AppError::PermissionDenied(
                "This invitation was issued to a different email address".to_string(),
            ));
        }

        let already_member = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM organization_members WHERE organization_id = $1 AND user_id = $2)",
        )
        .bind(invitation.organization_id)
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;

        if already_member {
            return Err(AppError::Conflict(
                "You are already a member of this organization".to_string(),
            ));
        }

        let membership = sqlx::query_as::<Postgres, Membership>(
            r#"
            INSERT INTO organization_members (organization_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, organization_id, user_id, role, joined_at
            "#,
        )
        .bind(invitation.organization_id)
        .bind(user.id)
        .bind(invitation.role)
        .fetch_one(&mut *tx)
        .await?;

        self.transition(&mut tx, invitation.id, InvitationStatus::Accepted)
            .await?;

        self.activity
            .record(
                &mut tx,
                NewActivity::new(
                    "org_invite_accepted",
                    format!("{} joined the organization", user.email),
                )
                .user(user.id)
                .organization(invitation.organization_id),
            )
            .await?;

        tx.commit().await?;

        Ok(membership)
    }

    /// Decline an invitation addressed to `user`.
    #[tracing::instrument(skip(self, token, user), fields(db.table = "organization_invitations", db.operation = "update", user.id = %user.id))]
    pub async fn decline(&self, token: &str, user: &User) -> Result<Invitation, AppError> {
        let mut tx = self.pool.begin().await?;

        let invitation = self.lock_by_token(&mut tx, token).await?;
        Self::guard_pending(&invitation)?;
        if invitation.is_expired_at(Utc::now()) {
            // Lazy expiry: persist the terminal state, then fail the call.
            self.transition(&mut tx, invitation.id, InvitationStatus::Expired)
                .await?;
            tx.commit().await?;
            return Err(AppError::InvitationExpired(
                "Invitation has expired".to_string(),
            ));
        }

        if !invitation.email.eq_ignore_ascii_case(&user.email) {
            return Err(AppError::PermissionDenied(
                "This invitation was issued to a different email address".to_string(),
            ));
        }

        let declined = self
            .transition(&mut tx, invitation.id, InvitationStatus::Declined)
            .await?;

        self.activity
            .record(
                &mut tx,
                NewActivity::new(
                    "org_invite_declined",
                    format!("{} declined the invitation", user.email),
                )
                .user(user.id)
                .organization(invitation.organization_id),
            )
            .await?;

        tx.commit().await?;

        Ok(declined)
    }

    /// Cancel a pending invitation from inside the organization.
    #[tracing::instrument(skip(self), fields(db.table = "organization_invitations", db.operation = "update", db.record_id = %invitation_id))]
    pub async fn cancel(
        &self,
        organization_id: Uuid,
        invitation_id: Uuid,
        cancelled_by: Uuid,
    ) -> Result<Invitation, AppError> {
        let mut tx = self.pool.begin().await?;

        let invitation = sqlx::query_as::<Postgres, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM organization_invitations \
             WHERE id = $1 AND organization_id = $2 FOR UPDATE",
        ))
        .bind(invitation_id)
        .bind(organization_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

        Self::guard_pending(&invitation)?;

        let cancelled = self
            .transition(&mut tx, invitation.id, InvitationStatus::Cancelled)
            .await?;

        self.activity
            .record(
                &mut tx,
                NewActivity::new(
                    "org_invite_cancelled",
                    format!("Invitation to {} cancelled", invitation.email),
                )
                .user(cancelled_by)
                .organization(organization_id),
            )
            .await?;

        tx.commit().await?;

        Ok(cancelled)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_invitations", db.operation = "select", org.id = %organization_id))]
    pub async fn list_for_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<Invitation>, AppError> {
        let invitations = sqlx::query_as::<Postgres, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM organization_invitations \
             WHERE organization_id = $1 ORDER BY created_at DESC",
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invitations)
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError> {
        let invitation = sqlx::query_as::<Postgres, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM organization_invitations WHERE token = $1",
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invitation)
    }

    async fn lock_by_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: &str,
    ) -> Result<Invitation, AppError> {
        sqlx::query_as::<Postgres, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM organization_invitations WHERE token = $1 FOR UPDATE",
        ))
        .bind(token)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))
    }

    fn guard_pending(invitation: &Invitation) -> Result<(), AppError> {
        if invitation.status != InvitationStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Invitation is no longer pending (status: {:?})",
                invitation.status
            )));
        }
        Ok(())
    }

    async fn transition(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: InvitationStatus,
    ) -> Result<Invitation, AppError> {
        let invitation = sqlx::query_as::<Postgres, Invitation>(&format!(
            r#"
            UPDATE organization_invitations
            SET status = $2, responded_at = NOW()
            WHERE id = $1
            RETURNING {INVITATION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .fetch_one(&mut **tx)
        .await?;

        Ok(invitation)
    }
}
