use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpConfig;
use crate::pipeline::Notifier;

/// Email notifier over authenticated, STARTTLS-upgraded SMTP.
///
/// Every call opens a fresh session, authenticates, sends one message and
/// closes; no connection is reused. Callers treat send failures as non-fatal.
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
            .with_context(|| format!("Invalid SMTP relay host: {}", self.config.host))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.email.clone(),
                self.config.password.clone(),
            ))
            .build();
        Ok(transport)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let from: Mailbox = self
            .config
            .email
            .parse()
            .with_context(|| format!("Invalid sender address: {}", self.config.email))?;
        let to: Mailbox = self
            .config
            .recipient
            .parse()
            .with_context(|| format!("Invalid recipient address: {}", self.config.recipient))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        info!(
            "Sending email to {} with subject: {subject}",
            self.config.recipient
        );
        self.transport()?.send(message).await?;
        info!("Email sent successfully to {}", self.config.recipient);
        Ok(())
    }
}
