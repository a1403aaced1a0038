//! API handlers.

pub mod upload;

pub use upload::*;

use std::sync::Arc;

use crate::config::Config;
use crate::relay::{MailTransport, RelayDispatcher};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Dispatcher for composed messages.
    pub dispatcher: RelayDispatcher,
    /// Service account address used as `From`.
    pub from_address: String,
    /// Maximum combined attachment size per request.
    pub max_attachment_bytes: usize,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        dispatcher: RelayDispatcher,
        from_address: impl Into<String>,
        max_attachment_bytes: usize,
    ) -> Self {
        Self {
            dispatcher,
            from_address: from_address.into(),
            max_attachment_bytes,
        }
    }

    /// Build the state from configuration and a transport.
    pub fn from_config(config: &Config, transport: Arc<dyn MailTransport>) -> Self {
        Self::new(
            RelayDispatcher::new(transport, config.smtp.timeout()),
            config.smtp.from_address(),
            config.limits.max_attachment_bytes,
        )
    }
}
