//! Security audit event stream
//!
//! Security-relevant events (authentication outcomes, throttling, permission
//! denials) are emitted as structured tracing events under `target: "audit"`.
//! Operators can route that target to a separate sink without touching
//! application logs. This stream is distinct from the database activity log,
//! which records tenant-visible domain events.

use std::net::IpAddr;

use uuid::Uuid;

/// Builder for one audit event. Unset fields are omitted from the record.
#[derive(Debug)]
pub struct AuditLogEntry {
    event: &'static str,
    user_id: Option<Uuid>,
    organization_id: Option<Uuid>,
    client_ip: Option<IpAddr>,
    outcome: Option<&'static str>,
    detail: Option<String>,
}

impl AuditLogEntry {
    pub fn new(event: &'static str) -> Self {
        Self {
            event,
            user_id: None,
            organization_id: None,
            client_ip: None,
            outcome: None,
            detail: None,
        }
    }

    pub fn user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn organization_id(mut self, organization_id: Uuid) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    pub fn client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    pub fn outcome(mut self, outcome: &'static str) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn log(self) {
        tracing::info!(
            target: "audit",
            event = self.event,
            user_id = self.user_id.map(tracing::field::display),
            organization_id = self.organization_id.map(tracing::field::display),
            client_ip = self.client_ip.map(tracing::field::display),
            outcome = self.outcome,
            detail = self.detail.as_deref(),
            "audit event"
        );
    }
}
