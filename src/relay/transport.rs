//! Mail transports.

use async_trait::async_trait;
use lettre::message::{
    header::ContentType, Attachment, Mailbox, Mailboxes, MultiPart, SinglePart,
};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{SmtpConfig, SmtpTls};
use crate::contact::OutboundMessage;
use crate::{RelayError, Result};

const OCTET_STREAM: &str = "application/octet-stream";

/// Hands a composed message to a mail provider.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send one message. A single attempt; no retries.
    async fn send(&self, message: &OutboundMessage) -> Result<()>;
}

/// SMTP transport with account credentials.
#[derive(Clone)]
pub struct SmtpTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Build a pooled SMTP transport from configuration.
    ///
    /// No connection is made until the first send.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let builder = match config.tls {
            SmtpTls::Wrapper => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.relay)?,
            SmtpTls::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.relay)?
            }
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.relay),
        };

        let inner = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout()))
            .build();

        Ok(Self { inner })
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let email = build_message(message)?;
        let response = self.inner.send(email).await?;

        if !response.is_positive() {
            return Err(RelayError::Transport(format!(
                "relay answered {}",
                response.code()
            )));
        }
        Ok(())
    }
}

/// Convert an [`OutboundMessage`] into a MIME message.
///
/// `to` may list several comma-separated recipients. Without attachments the
/// body is sent as a single text part; otherwise as `multipart/mixed` with the
/// text first and files in upload order.
pub fn build_message(message: &OutboundMessage) -> Result<Message> {
    let mut builder = Message::builder()
        .from(message.from.parse::<Mailbox>()?)
        .subject(message.subject.clone());

    for recipient in message.to.parse::<Mailboxes>()? {
        builder = builder.to(recipient);
    }

    // lettre's address parser is stricter than form validation
    if let Some(reply_to) = &message.reply_to {
        match reply_to.parse::<Mailbox>() {
            Ok(mailbox) => builder = builder.reply_to(mailbox),
            Err(e) => tracing::debug!(reply_to = %reply_to, error = %e, "Skipping Reply-To"),
        }
    }

    if message.attachments.is_empty() {
        return Ok(builder
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?);
    }

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(message.body.clone()));
    for file in &message.attachments {
        let content_type = ContentType::parse(&file.content_type)
            .or_else(|_| ContentType::parse(OCTET_STREAM))
            .map_err(|e| RelayError::Message(format!("invalid content type: {e}")))?;
        parts = parts.singlepart(
            Attachment::new(file.filename.clone()).body(file.content.clone(), content_type),
        );
    }

    Ok(builder.multipart(parts)?)
}
