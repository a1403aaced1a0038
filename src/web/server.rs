//! Web server for formrelay.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::rate_limit::RateLimitConfig;
use crate::relay::MailTransport;
use crate::{RelayError, Result};

use super::handlers::AppState;
use super::middleware::RateLimitState;
use super::router::create_router;

/// HTTP server for the contact form relay.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Rate limiting state.
    rate_limit: Arc<RateLimitState>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
    /// Interval between rate limit sweeps.
    sweep_interval: Duration,
}

impl WebServer {
    /// Create a new web server sending mail through `transport`.
    pub fn new(config: &Config, transport: Arc<dyn MailTransport>) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| RelayError::Config(format!("invalid server address: {e}")))?;

        let app_state = Arc::new(AppState::from_config(config, transport));
        let rate_limit = Arc::new(RateLimitState::new(
            RateLimitConfig::from(&config.limits),
            config.server.trust_forwarded_headers,
        ));

        Ok(Self {
            addr,
            app_state,
            rate_limit,
            cors_origins: config.server.cors_origins.clone(),
            sweep_interval: Duration::from_secs(config.limits.rate_limit_sweep_secs.max(1)),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn router(&self) -> Router {
        create_router(
            self.app_state.clone(),
            self.rate_limit.clone(),
            &self.cors_origins,
        )
    }

    async fn bind(&self) -> Result<(TcpListener, SocketAddr)> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        // Start sweeping after a successful bind
        self.rate_limit.clone().start_sweep_task(self.sweep_interval);
        tracing::info!(
            interval_secs = self.sweep_interval.as_secs(),
            "Rate limit sweep task started"
        );

        tracing::info!("Web server listening on http://{}", local_addr);
        Ok((listener, local_addr))
    }

    /// Run the web server.
    pub async fn run(self) -> Result<()> {
        let router = self.router();
        let (listener, _) = self.bind().await?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }

    /// Run the server in the background and return the bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let router = self.router();
        let (listener, local_addr) = self.bind().await?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
