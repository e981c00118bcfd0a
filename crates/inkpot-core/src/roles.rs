//! Organization roles and the capability sets they grant.
//!
//! Authorization decisions go through `Capabilities`, resolved once per
//! request from the caller's membership role, rather than through scattered
//! role comparisons at each call site.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Membership role within an organization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
    Viewer,
}

/// What a role is allowed to do inside its organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_invite: bool,
    pub can_cancel_invitations: bool,
    pub can_manage_projects: bool,
    pub can_delete_org: bool,
    pub can_view: bool,
}

impl Role {
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Role::Owner | Role::Admin => Capabilities {
                can_invite: true,
                can_cancel_invitations: true,
                can_manage_projects: true,
                can_delete_org: true,
                can_view: true,
            },
            Role::Member => Capabilities {
                can_invite: false,
                can_cancel_invitations: false,
                can_manage_projects: true,
                can_delete_org: false,
                can_view: true,
            },
            Role::Viewer => Capabilities {
                can_invite: false,
                can_cancel_invitations: false,
                can_manage_projects: false,
                can_delete_org: false,
                can_view: true,
            },
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
            Role::Viewer => "viewer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_capabilities() {
        let caps = Role::Admin.capabilities();
        assert!(caps.can_invite);
        assert!(caps.can_cancel_invitations);
        assert!(caps.can_manage_projects);
        assert!(caps.can_delete_org);
        assert!(caps.can_view);
    }

    #[test]
    fn test_only_admins_can_delete_org() {
        assert!(Role::Owner.capabilities().can_delete_org);
        assert!(Role::Admin.capabilities().can_delete_org);
        assert!(!Role::Member.capabilities().can_delete_org);
        assert!(!Role::Viewer.capabilities().can_delete_org);
    }

    #[test]
    fn test_member_capabilities() {
        let caps = Role::Member.capabilities();
        assert!(!caps.can_invite);
        assert!(caps.can_manage_projects);
        assert!(caps.can_view);
    }

    #[test]
    fn test_viewer_is_read_only() {
        let caps = Role::Viewer.capabilities();
        assert!(!caps.can_invite);
        assert!(!caps.can_cancel_invitations);
        assert!(!caps.can_manage_projects);
        assert!(!caps.can_delete_org);
        assert!(caps.can_view);
    }

    #[test]
    fn test_is_admin() {
        assert!(Role::Owner.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Member.is_admin());
        assert!(!Role::Viewer.is_admin());
    }
}
