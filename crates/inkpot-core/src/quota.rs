//! Plan-based project quotas.
//!
//! Pure policy: the limit lookup and comparison live here; the atomic
//! check-and-increment around them is the repository's job.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Subscription plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Starter,
    Pro,
    Business,
}

impl Plan {
    /// Resolve a stored plan name. Unknown names fall back to the most
    /// restrictive plan rather than granting unlimited capacity.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "pro" => Plan::Pro,
            "business" => Plan::Business,
            _ => Plan::Starter,
        }
    }

    pub fn max_projects(&self) -> i32 {
        match self {
            Plan::Starter => 1,
            Plan::Pro => 5,
            Plan::Business => 20,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Starter => "starter",
            Plan::Pro => "pro",
            Plan::Business => "business",
        }
    }
}

/// Whether an organization on `plan_name` with `active_projects` live
/// projects may create one more.
pub fn allow_create_project(plan_name: &str, active_projects: i32) -> bool {
    active_projects < Plan::from_name(plan_name).max_projects()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_limits() {
        assert_eq!(Plan::Starter.max_projects(), 1);
        assert_eq!(Plan::Pro.max_projects(), 5);
        assert_eq!(Plan::Business.max_projects(), 20);
    }

    #[test]
    fn test_unknown_plan_fails_closed() {
        assert_eq!(Plan::from_name("enterprise"), Plan::Starter);
        assert_eq!(Plan::from_name(""), Plan::Starter);
        assert_eq!(Plan::from_name("PRO "), Plan::Starter);
    }

    #[test]
    fn test_plan_name_case_insensitive() {
        assert_eq!(Plan::from_name("Pro"), Plan::Pro);
        assert_eq!(Plan::from_name("BUSINESS"), Plan::Business);
        assert_eq!(Plan::from_name("starter"), Plan::Starter);
    }

    #[test]
    fn test_allow_create_project_at_boundary() {
        assert!(allow_create_project("starter", 0));
        assert!(!allow_create_project("starter", 1));
        assert!(allow_create_project("pro", 4));
        assert!(!allow_create_project("pro", 5));
        assert!(allow_create_project("business", 19));
        assert!(!allow_create_project("business", 20));
    }

    #[test]
    fn test_unknown_plan_uses_starter_limit() {
        assert!(allow_create_project("galactic", 0));
        assert!(!allow_create_project("galactic", 1));
    }
}
