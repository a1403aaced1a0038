//! In-memory attachment collection with a combined size cap.

use thiserror::Error;

use super::types::FileBlob;

/// Name used for file parts that arrive without a filename.
pub const DEFAULT_ATTACHMENT_NAME: &str = "attachment";

/// Attachment collection error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    /// Combined attachment size went over the limit.
    #[error("attachments exceed the limit of {limit} bytes")]
    TooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },
}

/// Gathers uploaded files chunk by chunk.
///
/// The running total is checked before each chunk is copied, so the memory
/// held never exceeds the limit.
#[derive(Debug)]
pub struct AttachmentCollector {
    limit: usize,
    total: usize,
    files: Vec<FileBlob>,
}

impl AttachmentCollector {
    /// Create a collector accepting at most `limit` bytes across all files.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            total: 0,
            files: Vec::new(),
        }
    }

    /// Start a new file. Following [`append`](Self::append) calls add to it.
    ///
    /// The content type falls back to a guess from the filename extension.
    pub fn begin(&mut self, filename: Option<&str>, content_type: Option<&str>) {
        let filename = filename
            .map(sanitize_filename)
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_ATTACHMENT_NAME.to_string());

        let content_type = match content_type {
            Some(ct) if !ct.trim().is_empty() => ct.trim().to_string(),
            _ => mime_guess::from_path(&filename)
                .first_or_octet_stream()
                .to_string(),
        };

        self.files.push(FileBlob::new(filename, content_type, Vec::new()));
    }

    /// Add a chunk to the current file.
    pub fn append(&mut self, chunk: &[u8]) -> Result<(), AttachmentError> {
        let total = self.total.saturating_add(chunk.len());
        if total > self.limit {
            return Err(AttachmentError::TooLarge { limit: self.limit });
        }

        if self.files.is_empty() {
            self.begin(None, None);
        }
        if let Some(file) = self.files.last_mut() {
            file.content.extend_from_slice(chunk);
        }
        self.total = total;
        Ok(())
    }

    /// Bytes collected so far.
    pub fn total_bytes(&self) -> usize {
        self.total
    }

    /// Number of files collected so far.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file has been started.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The collected files in upload order.
    pub fn into_attachments(self) -> Vec<FileBlob> {
        self.files
    }
}

/// Keep the last path component and drop control characters.
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    base.chars().filter(|c| !c.is_control()).collect()
}
