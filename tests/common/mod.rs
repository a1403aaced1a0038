//! Test helpers for Web API tests.
//!
//! Provides a recording mail transport and a router-backed test server.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;

use formrelay::config::Config;
use formrelay::rate_limit::RateLimitConfig;
use formrelay::relay::MailTransport;
use formrelay::web::handlers::AppState;
use formrelay::web::middleware::RateLimitState;
use formrelay::web::router::create_router;
use formrelay::{OutboundMessage, RelayError, Result};

/// Transport that keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundMessage>>,
    fail: bool,
}

impl RecordingTransport {
    /// A transport whose sends always succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose sends always fail.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages handed to the transport so far.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of send attempts.
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail {
            return Err(RelayError::Transport("535 authentication failed".to_string()));
        }
        Ok(())
    }
}

/// Create a test configuration.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.trust_forwarded_headers = true;
    config.smtp.username = "relay@example.com".to_string();
    config.smtp.password = "app-password".to_string();
    config
}

/// Create a test server around the given transport.
pub fn create_test_server_with(
    config: &Config,
    transport: Arc<RecordingTransport>,
) -> TestServer {
    let app_state = Arc::new(AppState::from_config(config, transport));
    let rate_limit = Arc::new(RateLimitState::new(
        RateLimitConfig::from(&config.limits),
        config.server.trust_forwarded_headers,
    ));

    let router = create_router(app_state, rate_limit, &config.server.cors_origins);
    TestServer::new(router).expect("Failed to create test server")
}

/// Create a test server with default limits and a succeeding transport.
pub fn create_test_server() -> (TestServer, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new());
    let server = create_test_server_with(&create_test_config(), transport.clone());
    (server, transport)
}
