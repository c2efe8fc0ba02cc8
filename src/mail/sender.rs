use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

use crate::config::SmtpSettings;
use crate::report::Report;

/// A digest ready to go back to whoever sent the original alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingReply {
    pub to: String,
    pub subject: String,
    pub report: Report,
}

/// Transports a reply. Implementations must not retry on their own; a
/// failure is returned to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, reply: &OutgoingReply) -> Result<()>;
}

/// Sends replies through an SMTP relay as `multipart/alternative`.
pub struct SmtpMailSender {
    from_address: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailSender {
    pub fn new(from_address: impl Into<String>, settings: &SmtpSettings) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .with_context(|| format!("SMTP relay error for {}", settings.host))?
            .port(settings.port);

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            from_address: from_address.into(),
            transport: builder.build(),
        })
    }
}

/// Build the MIME message for a reply.
pub fn build_message(from_address: &str, reply: &OutgoingReply) -> Result<Message> {
    Message::builder()
        .from(from_address.parse().context("Invalid from address")?)
        .to(reply.to.parse().context("Invalid to address")?)
        .subject(reply.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            reply.report.plaintext.clone(),
            reply.report.html.clone(),
        ))
        .context("Failed to build email")
}

#[async_trait]
impl MailSender for SmtpMailSender {
    #[instrument(skip_all, fields(to = %reply.to))]
    async fn send(&self, reply: &OutgoingReply) -> Result<()> {
        let message = build_message(&self.from_address, reply)?;
        self.transport
            .send(message)
            .await
            .context("SMTP send failed")?;
        info!("Reply sent to {}", reply.to);
        Ok(())
    }
}
