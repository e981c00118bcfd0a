//! Inkpot database layer
//!
//! Repositories over PostgreSQL. Multi-step operations (organization
//! creation, invitation transitions, project creation/deletion) run in a
//! single transaction with row locks where they read-then-write.

pub mod db;

pub use db::{
    ActivityFilter, ActivityRepository, GenerationRepository, InvitationRepository, MemberInfo,
    MembershipRepository, NewActivity, OrganizationRepository, PostRepository, ProjectRepository,
    UserRepository,
};
