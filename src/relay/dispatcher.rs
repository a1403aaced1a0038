//! Single-attempt dispatch with a bounded timeout.

use std::sync::Arc;
use std::time::Duration;

use super::transport::MailTransport;
use crate::contact::OutboundMessage;
use crate::{RelayError, Result};

/// Sends composed messages through a [`MailTransport`].
#[derive(Clone)]
pub struct RelayDispatcher {
    transport: Arc<dyn MailTransport>,
    timeout: Duration,
}

impl RelayDispatcher {
    /// Create a dispatcher that gives each send at most `timeout`.
    pub fn new(transport: Arc<dyn MailTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Send `message` once.
    ///
    /// Failures are logged here with full detail; callers only need to map
    /// the outcome to a response.
    pub async fn dispatch(&self, message: &OutboundMessage) -> Result<()> {
        let result = match tokio::time::timeout(self.timeout, self.transport.send(message)).await
        {
            Ok(result) => result,
            Err(_) => Err(RelayError::Timeout(self.timeout.as_secs())),
        };

        match &result {
            Ok(()) => tracing::info!(
                to = %message.to,
                subject = %message.subject,
                attachments = message.attachments.len(),
                bytes = message.attachment_bytes(),
                "Email sent successfully"
            ),
            Err(e) => tracing::error!(
                to = %message.to,
                subject = %message.subject,
                error = %e,
                "Error sending email"
            ),
        }

        result
    }
}
