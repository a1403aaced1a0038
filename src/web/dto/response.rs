//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::contact::FieldError;

/// Success confirmation.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Confirmation text.
    pub message: String,
}

impl MessageResponse {
    /// Create a new confirmation.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Generic error body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Error text.
    pub error: String,
}

/// Field validation error body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorBody {
    /// Every failed rule.
    pub errors: Vec<FieldError>,
}
