//! Outbound mail relay.
//!
//! [`MailTransport`] is the seam to the external mail provider;
//! [`RelayDispatcher`] makes one bounded attempt per message.

pub mod dispatcher;
pub mod transport;

pub use dispatcher::RelayDispatcher;
pub use transport::{build_message, MailTransport, SmtpTransport};
