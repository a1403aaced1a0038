//! Contact form data types.

/// One uploaded file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    /// Original filename as sent by the client.
    pub filename: String,
    /// MIME type of the content.
    pub content_type: String,
    /// File content.
    pub content: Vec<u8>,
}

impl FileBlob {
    /// Create a new file blob.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content,
        }
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// A validated contact form submission.
///
/// Only produced by [`ContactForm::into_request`](super::ContactForm::into_request).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    /// Sender name.
    pub name: String,
    /// Sender email address.
    pub email: String,
    /// Sender phone number.
    pub phone_number: Option<String>,
    /// Message text.
    pub message: String,
    /// Recipient mailbox.
    pub destination: String,
    /// Identifier of the originating website.
    pub website: String,
    /// Uploaded files in upload order.
    pub attachments: Vec<FileBlob>,
}

/// A mail message ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Service account address.
    pub from: String,
    /// Address replies should go to.
    pub reply_to: Option<String>,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
    /// Files to attach.
    pub attachments: Vec<FileBlob>,
}

impl OutboundMessage {
    /// Combined size of all attachments in bytes.
    pub fn attachment_bytes(&self) -> usize {
        self.attachments.iter().map(FileBlob::size).sum()
    }
}
