//! Outbound email via SMTP
//!
//! Email is optional: when SMTP env vars are absent the service is simply not
//! constructed and callers skip sending. Invitation delivery is fire-and-forget
//! so a slow relay never holds up the API response; the invitation row is the
//! source of truth either way.

use inkpot_core::Config;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

#[derive(Clone)]
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    frontend_url: Option<String>,
}

impl EmailService {
    /// Returns None unless SMTP_HOST, SMTP_USER, SMTP_PASSWORD, and SMTP_FROM
    /// are all configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let host = config.smtp_host()?;
        let user = config.smtp_user()?;
        let password = config.smtp_password()?;
        let from = config.smtp_from()?;

        let mut builder = match AsyncSmtpTransport::<Tokio1Executor>::relay(host) {
            Ok(builder) => builder,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid SMTP relay configuration, email disabled");
                return None;
            }
        };
        if let Some(port) = config.smtp_port() {
            builder = builder.port(port);
        }
        let transport = builder
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        Some(Self {
            transport,
            from: from.to_string(),
            frontend_url: config.frontend_url().map(String::from),
        })
    }

    /// Send the invitation email in a background task. Delivery failures are
    /// logged, not surfaced: the invitee can still be re-sent the link.
    pub fn send_invitation(
        &self,
        to_email: &str,
        organization_name: &str,
        inviter_name: &str,
        token: &str,
    ) {
        let accept_url = match &self.frontend_url {
            Some(base) => format!("{}/invitations/{}", base.trim_end_matches('/'), token),
            None => format!("/invitations/{token}"),
        };
        let body = format!(
            "{inviter_name} has invited you to join {organization_name}.\n\n\
             Accept the invitation here: {accept_url}\n\n\
             This invitation expires in 7 days.",
        );

        let message = Message::builder()
            .from(match self.from.parse() {
                Ok(mailbox) => mailbox,
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid SMTP_FROM address, skipping email");
                    return;
                }
            })
            .to(match to_email.parse() {
                Ok(mailbox) => mailbox,
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid recipient address, skipping email");
                    return;
                }
            })
            .subject(format!("You're invited to join {organization_name}"))
            .header(ContentType::TEXT_PLAIN)
            .body(body);

        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build invitation email");
                return;
            }
        };

        let transport = self.transport.clone();
        tokio::spawn(async move {
            if let Err(e) = transport.send(message).await {
                tracing::warn!(error = %e, "Failed to send invitation email");
            }
        });
    }
}
