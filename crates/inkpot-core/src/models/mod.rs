//! Domain entities shared across the database and API layers.

mod activity;
mod generation;
mod invitation;
mod membership;
mod organization;
mod post;
mod project;
mod user;

pub use activity::ActivityLog;
pub use generation::{ContentGeneration, ContentType};
pub use invitation::{Invitation, InvitationStatus};
pub use membership::Membership;
pub use organization::Organization;
pub use post::BlogPost;
pub use project::Project;
pub use user::User;
