use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::roles::Role;

/// Invitation lifecycle state. `Pending` is the only state a transition can
/// start from; everything else is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
    Expired,
}

/// Organization invitation, addressed by an email and a secret token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub token: String,
    pub status: InvitationStatus,
    pub message: Option<String>,
    pub invited_by_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && self.expires_at < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation(status: InvitationStatus, expires_at: DateTime<Utc>) -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            email: "dana@example.com".to_string(),
            role: Role::Member,
            token: "tok".to_string(),
            status,
            message: None,
            invited_by_id: None,
            expires_at,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    #[test]
    fn test_pending_past_deadline_is_expired() {
        let now = Utc::now();
        let inv = invitation(InvitationStatus::Pending, now - Duration::hours(1));
        assert!(inv.is_expired_at(now));
    }

    #[test]
    fn test_pending_before_deadline_is_live() {
        let now = Utc::now();
        let inv = invitation(InvitationStatus::Pending, now + Duration::days(7));
        assert!(!inv.is_expired_at(now));
    }

    #[test]
    fn test_terminal_states_never_expire() {
        let now = Utc::now();
        for status in [
            InvitationStatus::Accepted,
            InvitationStatus::Declined,
            InvitationStatus::Cancelled,
            InvitationStatus::Expired,
        ] {
            let inv = invitation(status, now - Duration::days(30));
            assert!(!inv.is_expired_at(now));
        }
    }
}
