//! Configuration module for formrelay.

use lettre::message::Mailbox;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{RelayError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Take the caller identity from `X-Forwarded-For` / `X-Real-IP`.
    ///
    /// Only enable this behind a reverse proxy that overwrites these headers.
    #[serde(default)]
    pub trust_forwarded_headers: bool,
    /// CORS allowed origins (empty allows any origin).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            trust_forwarded_headers: false,
            cors_origins: vec![],
        }
    }
}

/// Connection security used towards the SMTP relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// Implicit TLS (SMTPS, usually port 465).
    Wrapper,
    /// Plain connection upgraded with STARTTLS (usually port 587).
    Starttls,
    /// No encryption. Local test relays only.
    None,
}

/// Outbound SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// SMTP relay hostname.
    #[serde(default = "default_smtp_relay")]
    pub relay: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Connection security.
    #[serde(default = "default_smtp_tls")]
    pub tls: SmtpTls,
    /// Mail account identity.
    #[serde(default)]
    pub username: String,
    /// Mail account secret.
    #[serde(default)]
    pub password: String,
    /// Sender address (defaults to the account username).
    #[serde(default)]
    pub from: Option<String>,
    /// Timeout for a single send in seconds.
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,
}

fn default_smtp_relay() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_smtp_tls() -> SmtpTls {
    SmtpTls::Wrapper
}

fn default_smtp_timeout() -> u64 {
    30
}

impl SmtpConfig {
    /// The address used in the `From` header.
    pub fn from_address(&self) -> &str {
        match &self.from {
            Some(from) if !from.is_empty() => from,
            _ => &self.username,
        }
    }

    /// Timeout for a single send.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            relay: default_smtp_relay(),
            port: default_smtp_port(),
            tls: default_smtp_tls(),
            username: String::new(),
            password: String::new(),
            from: None,
            timeout_secs: default_smtp_timeout(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum combined size of all attachments in one request.
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: usize,
    /// Requests admitted per caller in one window.
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,
    /// Rate limit window in seconds.
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,
    /// Interval between sweeps of expired rate limit windows.
    #[serde(default = "default_rate_limit_sweep")]
    pub rate_limit_sweep_secs: u64,
}

fn default_max_attachment_bytes() -> usize {
    5 * 1024 * 1024 // 5MB
}

fn default_rate_limit_max_requests() -> u32 {
    10
}

fn default_rate_limit_window() -> u64 {
    900 // 15 minutes
}

fn default_rate_limit_sweep() -> u64 {
    300 // 5 minutes
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_attachment_bytes: default_max_attachment_bytes(),
            rate_limit_max_requests: default_rate_limit_max_requests(),
            rate_limit_window_secs: default_rate_limit_window(),
            rate_limit_sweep_secs: default_rate_limit_sweep(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/formrelay.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Outbound SMTP configuration.
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Request limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RelayError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RelayError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FORMRELAY_SMTP_USERNAME`: mail account identity
    /// - `FORMRELAY_SMTP_PASSWORD`: mail account secret
    /// - `FORMRELAY_SMTP_FROM`: sender address
    pub fn apply_env_overrides(&mut self) {
        if let Some(username) = non_empty_env("FORMRELAY_SMTP_USERNAME") {
            self.smtp.username = username;
        }
        if let Some(password) = non_empty_env("FORMRELAY_SMTP_PASSWORD") {
            self.smtp.password = password;
        }
        if let Some(from) = non_empty_env("FORMRELAY_SMTP_FROM") {
            self.smtp.from = Some(from);
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - SMTP credentials are missing
    /// - the sender address is not a valid mailbox
    /// - the send timeout or a limit is zero
    pub fn validate(&self) -> Result<()> {
        if self.smtp.username.is_empty() || self.smtp.password.is_empty() {
            return Err(RelayError::Config(
                "smtp username and password must be set. \
                 Set them in config.toml or via FORMRELAY_SMTP_USERNAME / FORMRELAY_SMTP_PASSWORD."
                    .to_string(),
            ));
        }
        if let Err(e) = self.smtp.from_address().parse::<Mailbox>() {
            return Err(RelayError::Config(format!(
                "smtp sender {:?} is not a valid address: {e}",
                self.smtp.from_address()
            )));
        }
        if self.smtp.timeout_secs == 0 {
            return Err(RelayError::Config(
                "smtp.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.limits.max_attachment_bytes == 0 {
            return Err(RelayError::Config(
                "limits.max_attachment_bytes must be greater than zero".to_string(),
            ));
        }
        if self.limits.rate_limit_max_requests == 0 || self.limits.rate_limit_window_secs == 0 {
            return Err(RelayError::Config(
                "rate limit budget and window must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
