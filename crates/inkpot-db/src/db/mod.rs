//! Database repositories for data access layer
//!
//! One repository per aggregate. Each provides CRUD operations and the
//! specialized transactional queries its invariants need. The activity
//! repository is injected into the repositories that must append audit rows
//! inside their own transactions.

pub mod activity;
pub mod generation;
pub mod invitation;
pub mod membership;
pub mod organization;
pub mod post;
pub mod project;
pub mod user;

pub use activity::{ActivityFilter, ActivityRepository, NewActivity};
pub use generation::GenerationRepository;
pub use invitation::InvitationRepository;
pub use membership::{MemberInfo, MembershipRepository};
pub use organization::OrganizationRepository;
pub use post::PostRepository;
pub use project::ProjectRepository;
pub use user::UserRepository;
