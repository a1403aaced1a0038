//! Request DTOs for Web API.

use utoipa::ToSchema;

/// Multipart form accepted by `POST /upload_files`.
///
/// Documentation only: the handler reads the multipart stream field by field.
#[derive(Debug, ToSchema)]
pub struct UploadFilesForm {
    /// Sender name (required, at most 30 characters).
    pub name: String,
    /// Sender email address (required).
    pub email: String,
    /// Sender phone number.
    #[schema(rename = "phoneNum")]
    pub phone_num: Option<String>,
    /// Message text (at most 20 characters).
    pub message: Option<String>,
    /// Recipient mailbox (required).
    pub dest: String,
    /// Originating website identifier (required).
    pub website: String,
    /// Attachments, at most 5 MiB combined.
    #[schema(value_type = Vec<String>, format = Binary)]
    pub files: Vec<Vec<u8>>,
}
