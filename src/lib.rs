//! formrelay - contact form to email relay
//!
//! Accepts multipart contact form submissions over HTTP and forwards each one
//! as an email, with attachments, through an SMTP account.

pub mod config;
pub mod contact;
pub mod error;
pub mod logging;
pub mod rate_limit;
pub mod relay;
pub mod web;

pub use config::Config;
pub use contact::{ContactForm, ContactRequest, FieldError, FileBlob, OutboundMessage};
pub use error::{RelayError, Result};
pub use rate_limit::{RateLimitConfig, RateLimitResult, WindowRateLimiter};
pub use relay::{MailTransport, RelayDispatcher, SmtpTransport};
pub use web::{ApiError, WebServer};
