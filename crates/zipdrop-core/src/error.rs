//! Error types module
//!
//! Every way a relay request can fail is a variant of `RelayError`. Variants
//! self-describe how they are presented over HTTP through `ErrorMetadata`, so
//! the API layer renders all of them through one code path.

use serde::Serialize;

/// Longest upstream body excerpt carried in a failure, in characters.
pub const BODY_PREVIEW_MAX_CHARS: usize = 300;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for caller mistakes
    Debug,
    /// Warning level - for upstream failures outside our control
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPSTREAM_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Diagnostic payload for a failed file-host upload.
///
/// Serialized field names match the JSON envelope returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamFailure {
    #[serde(skip)]
    pub message: String,
    /// Upstream HTTP status, absent when no response was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Decoded upstream JSON, when the body was JSON but unusable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl UpstreamFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Attach a preview of the upstream body, truncated to `BODY_PREVIEW_MAX_CHARS`.
    pub fn with_body_preview(mut self, body: &str) -> Self {
        self.body_preview = Some(body_preview(body));
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }
}

impl std::fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

/// First `BODY_PREVIEW_MAX_CHARS` characters of `body`.
pub fn body_preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_MAX_CHARS).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Malformed multipart body: {0}")]
    MalformedMultipart(String),

    #[error("No files in request")]
    NoFiles,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Upstream upload failed: {0}")]
    Upstream(UpstreamFailure),

    #[error("Archive error: {0}")]
    Archive(#[source] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UpstreamFailure> for RelayError {
    fn from(failure: UpstreamFailure) -> Self {
        RelayError::Upstream(failure)
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn relay_error_static_metadata(err: &RelayError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        RelayError::MethodNotAllowed(_) => (405, "METHOD_NOT_ALLOWED", false, LogLevel::Debug),
        RelayError::UnsupportedContentType(_) => {
            (400, "UNSUPPORTED_CONTENT_TYPE", false, LogLevel::Debug)
        }
        RelayError::MalformedMultipart(_) => (400, "MALFORMED_MULTIPART", false, LogLevel::Debug),
        RelayError::NoFiles => (400, "NO_FILES", false, LogLevel::Debug),
        RelayError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, LogLevel::Debug),
        RelayError::Upstream(_) => (502, "UPSTREAM_ERROR", false, LogLevel::Warn),
        RelayError::Archive(_) => (500, "ARCHIVE_ERROR", true, LogLevel::Error),
        RelayError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl RelayError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed(_) => "MethodNotAllowed",
            RelayError::UnsupportedContentType(_) => "UnsupportedContentType",
            RelayError::MalformedMultipart(_) => "MalformedMultipart",
            RelayError::NoFiles => "NoFiles",
            RelayError::PayloadTooLarge(_) => "PayloadTooLarge",
            RelayError::Upstream(_) => "Upstream",
            RelayError::Archive(_) => "Archive",
            RelayError::Internal(_) => "Internal",
        }
    }

    /// Upstream diagnostics, if this is an upstream failure.
    pub fn upstream(&self) -> Option<&UpstreamFailure> {
        match self {
            RelayError::Upstream(failure) => Some(failure),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for RelayError {
    fn http_status_code(&self) -> u16 {
        relay_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        relay_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        relay_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        relay_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            RelayError::MethodNotAllowed(_) => "Method Not Allowed".to_string(),
            RelayError::UnsupportedContentType(_) => "Expected multipart/form-data".to_string(),
            RelayError::MalformedMultipart(ref msg) => format!("Invalid multipart body: {}", msg),
            RelayError::NoFiles => "No files".to_string(),
            RelayError::PayloadTooLarge(ref msg) => msg.clone(),
            RelayError::Upstream(ref failure) => failure.message.clone(),
            RelayError::Archive(_) => "Internal server error".to_string(),
            RelayError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors_are_4xx() {
        assert_eq!(RelayError::MethodNotAllowed("GET".into()).http_status_code(), 405);
        assert_eq!(
            RelayError::UnsupportedContentType("text/plain".into()).http_status_code(),
            400
        );
        assert_eq!(RelayError::MalformedMultipart("eof".into()).http_status_code(), 400);
        assert_eq!(RelayError::NoFiles.http_status_code(), 400);
        assert_eq!(RelayError::PayloadTooLarge("big".into()).http_status_code(), 413);
    }

    #[test]
    fn test_upstream_is_502_and_not_sensitive() {
        let err = RelayError::from(UpstreamFailure::new("file host returned no link"));
        assert_eq!(err.http_status_code(), 502);
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
        assert!(!err.is_sensitive());
        assert_eq!(err.client_message(), "file host returned no link");
        assert!(err.upstream().is_some());
    }

    #[test]
    fn test_internal_faults_hide_message() {
        let err = RelayError::Archive(anyhow::anyhow!("deflate stream broke"));
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Internal server error");
        assert!(err.detailed_message().contains("deflate stream broke"));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_body_preview_truncates_by_chars() {
        let long = "א".repeat(BODY_PREVIEW_MAX_CHARS + 50);
        let preview = body_preview(&long);
        assert_eq!(preview.chars().count(), BODY_PREVIEW_MAX_CHARS);
        assert_eq!(body_preview("short"), "short");
    }

    #[test]
    fn test_upstream_failure_serializes_camel_case() {
        let failure = UpstreamFailure::new("bad")
            .with_status(200)
            .with_content_type(Some("text/html".to_string()))
            .with_body_preview("<html>");
        let json = serde_json::to_value(&failure).expect("serialize");
        assert_eq!(json["status"], 200);
        assert_eq!(json["contentType"], "text/html");
        assert_eq!(json["bodyPreview"], "<html>");
        assert!(json.get("message").is_none());
        assert!(json.get("details").is_none());
        assert!(json.get("raw").is_none());
    }
}
