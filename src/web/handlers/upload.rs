//! Contact form upload handler.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::contact::{compose, AttachmentCollector, ContactForm, FileBlob};
use crate::web::dto::MessageResponse;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Multipart field carrying attachments.
const FILES_FIELD: &str = "files";

/// POST /upload_files - Relay a contact form submission as email.
///
/// Request body: multipart/form-data with `name`, `email`, `phoneNum`,
/// `message`, `dest`, `website` and any number of `files`.
#[utoipa::path(
    post,
    path = "/upload_files",
    tag = "contact",
    request_body(
        content = UploadFilesForm,
        content_type = "multipart/form-data",
        description = "Contact form fields and attachments"
    ),
    responses(
        (status = 200, description = "Email sent", body = MessageResponse),
        (status = 400, description = "Field validation failed", body = ValidationErrorBody),
        (status = 413, description = "Attachments over the size limit", body = ErrorBody),
        (status = 429, description = "Too many requests from this caller", body = ErrorBody),
        (status = 500, description = "Email could not be sent", body = ErrorBody)
    )
)]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected non-multipart upload: {}", e);
        ApiError::bad_request("Request must be multipart/form-data")
    })?;

    let (form, attachments) = read_form(multipart, state.max_attachment_bytes).await?;

    let request = form.into_request(attachments).map_err(|errors| {
        tracing::debug!(count = errors.len(), "Contact form failed validation");
        ApiError::validation(errors)
    })?;

    let message = compose(request, &state.from_address);

    state
        .dispatcher
        .dispatch(&message)
        .await
        .map_err(|_| ApiError::internal("Error sending email"))?;

    Ok(Json(MessageResponse::new("Email sent successfully")))
}

/// Read every multipart field, collecting text fields and attachments.
///
/// Attachments are size-checked chunk by chunk while the body streams in.
async fn read_form(
    mut multipart: Multipart,
    max_attachment_bytes: usize,
) -> Result<(ContactForm, Vec<FileBlob>), ApiError> {
    let mut form = ContactForm::default();
    let mut collector = AttachmentCollector::new(max_attachment_bytes);

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        if name == FILES_FIELD {
            collector.begin(field.file_name(), field.content_type());
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                collector.append(&chunk)?;
            }
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        if !form.set(&name, value) {
            tracing::debug!(field = %name, "Ignoring unknown form field");
        }
    }

    Ok((form, collector.into_attachments()))
}

/// Map a multipart read failure. Body limit hits are reported as 413.
fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("Rejected upload over the request body limit: {}", e);
        return ApiError::payload_too_large("Request body too large");
    }
    tracing::error!("Error processing files: {}", e);
    ApiError::internal("Error processing files")
}
