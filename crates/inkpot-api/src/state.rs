//! Shared application state
//!
//! A single `AppState` is cloned into every handler. Repositories hold a
//! `PgPool` clone internally, so cloning the state is cheap.

use std::sync::Arc;

use inkpot_core::Config;
use inkpot_db::{
    ActivityRepository, GenerationRepository, InvitationRepository, MembershipRepository,
    OrganizationRepository, PostRepository, ProjectRepository, UserRepository,
};
use sqlx::PgPool;

use crate::auth::middleware::AuthFailureLimiter;
use crate::middleware::rate_limit::HttpRateLimiter;
use crate::services::content::TextGenerator;
use crate::services::email::EmailService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub users: UserRepository,
    pub organizations: OrganizationRepository,
    pub memberships: MembershipRepository,
    pub invitations: InvitationRepository,
    pub projects: ProjectRepository,
    pub posts: PostRepository,
    pub generations: GenerationRepository,
    pub activity: ActivityRepository,
    /// Absent when SMTP is not configured; invitation emails are then skipped.
    pub email: Option<EmailService>,
    /// Absent when no AI provider is configured; generation requests then fail
    /// with a 400 telling the operator what to set.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub auth_failures: AuthFailureLimiter,
    pub rate_limiter: HttpRateLimiter,
}

impl AppState {
    pub fn new(
        config: Config,
        pool: PgPool,
        email: Option<EmailService>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let activity = ActivityRepository::new(pool.clone());
        let auth_failures = AuthFailureLimiter::new(config.auth_failure_limit_per_minute());
        let rate_limiter = HttpRateLimiter::new(config.http_rate_limit_per_minute());
        Self {
            users: UserRepository::new(pool.clone()),
            organizations: OrganizationRepository::new(pool.clone(), activity.clone()),
            memberships: MembershipRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone(), activity.clone()),
            projects: ProjectRepository::new(
                pool.clone(),
                OrganizationRepository::new(pool.clone(), activity.clone()),
                activity.clone(),
            ),
            posts: PostRepository::new(pool.clone()),
            generations: GenerationRepository::new(pool.clone()),
            activity,
            config,
            pool,
            email,
            generator,
            auth_failures,
            rate_limiter,
        }
    }
}
