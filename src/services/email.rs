//! SMTP email channel via `lettre`, sending an HTML digest over STARTTLS

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailSettings;
use crate::models::ScoredListing;
use crate::services::digest;
use crate::services::notifier::{Notifier, NotifyError};

/// Sends match digests as HTML emails
#[derive(Debug)]
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// Build an `EmailNotifier` from settings
    ///
    /// The sender address doubles as the SMTP username. Returns
    /// [`NotifyError::Config`] when sender, password or recipient is
    /// missing or does not parse.
    pub fn from_settings(settings: &EmailSettings) -> Result<Self, NotifyError> {
        let (Some(sender), Some(password), Some(recipient)) = (
            settings.sender.as_deref().filter(|v| !v.is_empty()),
            settings.password.as_deref().filter(|v| !v.is_empty()),
            settings.recipient.as_deref().filter(|v| !v.is_empty()),
        ) else {
            return Err(NotifyError::Config(
                "email sender, password and recipient are required".to_string(),
            ));
        };

        let from: Mailbox = sender
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;
        let to: Mailbox = recipient
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_server)
            .map_err(|e| NotifyError::Config(e.to_string()))?
            .port(settings.smtp_port)
            .credentials(Credentials::new(sender.to_string(), password.to_string()))
            .build();

        Ok(Self { transport, from, to })
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, matches: &[ScoredListing]) -> Result<(), NotifyError> {
        let html = digest::render_html(matches)?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(digest::subject(matches))
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        tracing::info!(
            "Email sent to {} with {} job(s)",
            self.to.email,
            matches.len()
        );

        Ok(())
    }

    fn channel_name(&self) -> &str {
        "email"
    }
}
