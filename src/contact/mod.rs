//! Contact form pipeline: validation, attachment collection and message
//! composition.

pub mod attachment;
pub mod compose;
pub mod types;
pub mod validation;

pub use attachment::{AttachmentCollector, AttachmentError, DEFAULT_ATTACHMENT_NAME};
pub use compose::{compose, subject_for};
pub use types::{ContactRequest, FileBlob, OutboundMessage};
pub use validation::{ContactForm, FieldError};
