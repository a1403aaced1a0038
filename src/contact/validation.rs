//! Contact form field validation.

use serde::Serialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use super::types::{ContactRequest, FileBlob};

/// Form fields in the order errors are reported.
const FIELD_ORDER: [&str; 5] = ["name", "email", "message", "dest", "website"];

/// Error code of the presence rule.
const REQUIRED: &str = "required";

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Form field name.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Raw text fields of a contact form submission.
///
/// Field names follow the multipart form (`dest`, `phoneNum`), not the
/// validated [`ContactRequest`].
///
/// `message` is only capped at 20 characters and may be empty, unlike the
/// other text fields.
#[derive(Debug, Clone, Default, Validate)]
pub struct ContactForm {
    #[validate(
        custom(function = "required", message = "Name is required"),
        length(max = 30, message = "Name must be at most 30 characters")
    )]
    pub name: String,

    #[validate(
        custom(function = "required", message = "Email is required"),
        email(message = "Invalid email address")
    )]
    pub email: String,

    pub phone_num: Option<String>,

    #[validate(length(max = 20, message = "Message must be at most 20 characters"))]
    pub message: String,

    #[validate(custom(function = "required", message = "Destination is required"))]
    pub dest: String,

    #[validate(custom(function = "required", message = "Website is required"))]
    pub website: String,
}

impl ContactForm {
    /// Store a text field by its form name.
    ///
    /// Returns `false` for fields the form does not know about.
    pub fn set(&mut self, field: &str, value: String) -> bool {
        match field {
            "name" => self.name = value,
            "email" => self.email = value,
            "phoneNum" => self.phone_num = Some(value),
            "message" => self.message = value,
            "dest" => self.dest = value,
            "website" => self.website = value,
            _ => return false,
        }
        true
    }

    /// Validate every rule and report all failures.
    pub fn check(&self) -> Result<(), Vec<FieldError>> {
        self.validate().map_err(|e| collect_field_errors(&e))
    }

    /// Validate the form and build a [`ContactRequest`] carrying `attachments`.
    pub fn into_request(self, attachments: Vec<FileBlob>) -> Result<ContactRequest, Vec<FieldError>> {
        self.check()?;

        Ok(ContactRequest {
            name: self.name,
            email: self.email,
            phone_number: self.phone_num.filter(|p| !p.is_empty()),
            message: self.message,
            destination: self.dest,
            website: self.website,
            attachments,
        })
    }
}

/// Flatten validator errors into a list ordered by form field.
///
/// Within a field the presence rule is reported first.
fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let field_errors = errors.field_errors();

    FIELD_ORDER
        .iter()
        .filter_map(|field| field_errors.get(*field).map(|errs| (*field, errs)))
        .flat_map(|(field, errs)| {
            let mut errs: Vec<&ValidationError> = errs.iter().collect();
            errs.sort_by_key(|e| e.code != REQUIRED);

            errs.into_iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                FieldError::new(field, message)
            })
        })
        .collect()
}

/// Reject the empty string. Whitespace counts as a value.
fn required(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(REQUIRED));
    }
    Ok(())
}
