//! Error types for formrelay.

use thiserror::Error;

/// Common error type for formrelay.
#[derive(Error, Debug)]
pub enum RelayError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Outbound message could not be built (bad address, bad header value).
    #[error("message error: {0}")]
    Message(String),

    /// The mail transport rejected the message or could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The mail transport did not answer in time.
    #[error("transport timed out after {0} seconds")]
    Timeout(u64),
}

impl From<lettre::error::Error> for RelayError {
    fn from(e: lettre::error::Error) -> Self {
        RelayError::Message(e.to_string())
    }
}

impl From<lettre::address::AddressError> for RelayError {
    fn from(e: lettre::address::AddressError) -> Self {
        RelayError::Message(format!("invalid address: {e}"))
    }
}

impl From<lettre::transport::smtp::Error> for RelayError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        RelayError::Transport(e.to_string())
    }
}

/// Result type alias for formrelay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
