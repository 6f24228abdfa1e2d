//! Request-scoped data model.
//!
//! Nothing here outlives a single relay request.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::RelayError;

/// One file part received in the multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Filename as sent by the client; may be empty.
    pub filename: String,
    /// Declared content type. Informational only.
    pub content_type: String,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }
}

/// Output of the multipart parser: file parts plus text fields.
#[derive(Debug, Clone, Default)]
pub struct ParsedForm {
    pub files: Vec<UploadedFile>,
    /// Last value seen for each text field.
    pub fields: HashMap<String, String>,
    /// Every value seen for each text field, in arrival order.
    pub multi_value_fields: HashMap<String, Vec<String>>,
}

impl ParsedForm {
    /// Record a text field, keeping both the single and multi-value views current.
    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        self.multi_value_fields
            .entry(name.clone())
            .or_default()
            .push(value.clone());
        self.fields.insert(name, value);
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.multi_value_fields
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// A named payload written into the output archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Bytes,
}

/// Outcome of one relay request.
#[derive(Debug)]
pub enum UploadResult {
    Success { url: String },
    Failure(RelayError),
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Success { .. })
    }
}

impl From<Result<String, RelayError>> for UploadResult {
    fn from(result: Result<String, RelayError>) -> Self {
        match result {
            Ok(url) => UploadResult::Success { url },
            Err(err) => UploadResult::Failure(err),
        }
    }
}
